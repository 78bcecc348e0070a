pub mod config;
pub mod count;
pub mod message;
pub mod photo;
pub mod reminder;
pub mod reset;
pub mod status;
pub mod watch;

use kapuchino_core::{
    Config, Database, LocalScheduler, NotificationManager, ReminderStore, SystemClock,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub type Store = ReminderStore<Database, SystemClock>;

/// Open the reminder state with the configured photo bounds.
pub fn open_store(config: &Config) -> CliResult<Store> {
    let store = ReminderStore::load(Database::open()?, SystemClock)
        .with_photo_config(config.photo.clone());
    Ok(store)
}

/// Notification manager over the on-disk scheduler, at the configured time.
pub fn open_notifications(
    config: &Config,
) -> CliResult<NotificationManager<LocalScheduler<Database>>> {
    let scheduler = LocalScheduler::new(Database::open()?, config.notifications.enabled);
    Ok(NotificationManager::new(scheduler, config.reminder.time()?))
}
