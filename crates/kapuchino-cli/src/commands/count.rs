use clap::Subcommand;
use kapuchino_core::Config;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum CountAction {
    /// Print the counter
    Show,
    /// Record a cappuccino drunk on Thursday
    Inc,
    /// Undo the last increment (stops at zero)
    Dec,
}

pub fn run(action: CountAction) -> CliResult {
    let config = Config::load()?;
    let mut store = open_store(&config)?;

    match action {
        CountAction::Show => {}
        CountAction::Inc => store.increment_counter(),
        CountAction::Dec => store.decrement_counter(),
    }
    println!("{}", store.cappuccino_count());
    Ok(())
}
