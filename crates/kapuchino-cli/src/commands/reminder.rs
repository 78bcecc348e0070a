use chrono::{Local, NaiveTime};
use clap::Subcommand;
use kapuchino_core::notify::REMINDER_ID;
use kapuchino_core::storage::ReminderConfig;
use kapuchino_core::{Config, NotificationScheduler};

use super::{open_notifications, CliResult};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Show the reminder time and registration
    Show,
    /// Change the Thursday reminder time
    Set {
        /// Time of day, HH:MM
        time: String,
    },
    /// Enable notifications and register the reminder
    Enable,
    /// Disable notifications and remove the registration
    Disable,
    /// Restore the default 09:00 reminder time
    Reset,
}

fn parse_time(value: &str) -> CliResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| format!("invalid time '{value}' (expected HH:MM): {e}").into())
}

/// Request permission and (re)register the reminder at the configured time.
pub async fn register(config: &Config) -> CliResult<bool> {
    let mut manager = open_notifications(config)?;
    Ok(manager.request_permission().await)
}

pub async fn run(action: ReminderAction) -> CliResult {
    let mut config = Config::load()?;

    match action {
        ReminderAction::Show => {
            let manager = open_notifications(&config)?;
            let reminder = manager.reminder();
            println!("Every Thursday at {}", reminder.time.format("%H:%M"));
            let pending = manager.scheduler().pending().await?;
            match pending.iter().find(|r| r.identifier == REMINDER_ID) {
                Some(registered) => println!(
                    "Registered: {} ({}), next {}",
                    registered.title,
                    registered.time.format("%H:%M"),
                    registered
                        .next_fire_after(&Local::now())
                        .format("%a %Y-%m-%d %H:%M")
                ),
                None => println!("Not registered"),
            }
        }
        ReminderAction::Set { time } => {
            config.reminder = ReminderConfig::from_time(parse_time(&time)?);
            config.save()?;
            report(register(&config).await?, &config)?;
        }
        ReminderAction::Enable => {
            config.notifications.enabled = true;
            config.save()?;
            report(register(&config).await?, &config)?;
        }
        ReminderAction::Disable => {
            config.notifications.enabled = false;
            config.save()?;
            let manager = open_notifications(&config)?;
            manager.scheduler().cancel(REMINDER_ID).await?;
            println!("notifications disabled");
        }
        ReminderAction::Reset => {
            config.reminder = ReminderConfig::default();
            config.save()?;
            report(register(&config).await?, &config)?;
        }
    }
    Ok(())
}

fn report(registered: bool, config: &Config) -> CliResult {
    let time = config.reminder.time()?;
    if registered {
        println!("reminder scheduled for Thursdays at {}", time.format("%H:%M"));
    } else {
        println!(
            "reminder time set to {}; notifications are disabled",
            time.format("%H:%M")
        );
    }
    Ok(())
}
