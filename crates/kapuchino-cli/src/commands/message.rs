use clap::Subcommand;
use kapuchino_core::Config;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum MessageAction {
    /// Print the current message
    Show,
    /// Replace the message
    Set {
        /// New message text (leading and trailing whitespace is trimmed)
        text: String,
    },
    /// Restore the default message
    Reset,
}

pub fn run(action: MessageAction) -> CliResult {
    let config = Config::load()?;
    let mut store = open_store(&config)?;

    match action {
        MessageAction::Show => println!("{}", store.message()),
        MessageAction::Set { text } => {
            store.set_message(&text)?;
            println!("{}", store.message());
        }
        MessageAction::Reset => {
            store.reset_message();
            println!("{}", store.message());
        }
    }
    Ok(())
}
