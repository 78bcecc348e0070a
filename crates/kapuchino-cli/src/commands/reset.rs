use kapuchino_core::storage::ReminderConfig;
use kapuchino_core::Config;

use super::reminder::register;
use super::{open_store, CliResult};

pub async fn run(yes: bool) -> CliResult {
    if !yes {
        return Err(
            "this resets message, counter, photo and reminder time; pass --yes to confirm".into(),
        );
    }

    let mut config = Config::load()?;
    let mut store = open_store(&config)?;
    store.reset_all();

    config.reminder = ReminderConfig::default();
    config.save()?;
    register(&config).await?;

    println!("all settings reset to defaults");
    Ok(())
}
