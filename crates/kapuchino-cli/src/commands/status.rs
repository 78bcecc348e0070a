use chrono::{DateTime, FixedOffset, Local};
use kapuchino_core::{Config, Progress, WeeklyReminder};
use serde::Serialize;

use super::{open_store, CliResult};

const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
struct StatusReport {
    message: String,
    cappuccino_count: u32,
    photo_bytes: Option<usize>,
    progress: Progress,
    next_reminder: DateTime<FixedOffset>,
    notifications_enabled: bool,
}

/// Text progress bar, e.g. `[#####---------------]  25%`.
pub fn render_bar(fraction: f64) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (fraction * 100.0).floor() as u32
    )
}

pub fn run(json: bool) -> CliResult {
    let config = Config::load()?;
    let mut store = open_store(&config)?;
    let progress = store.refresh_progress();
    let next_reminder = WeeklyReminder::thursday(config.reminder.time()?)
        .next_fire_after(&Local::now())
        .fixed_offset();

    if json {
        let report = StatusReport {
            message: store.message().to_string(),
            cappuccino_count: store.cappuccino_count(),
            photo_bytes: store.photo().map(<[u8]>::len),
            progress,
            next_reminder,
            notifications_enabled: config.notifications.enabled,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("☕ Kapuchino");
    println!("{}", store.message());
    println!();
    println!("{}", progress.label);
    println!("{}", render_bar(progress.fraction));
    println!();
    println!("Cappuccinos on Thursday: {}", store.cappuccino_count());
    match store.photo() {
        Some(photo) => println!("Photo: {} bytes", photo.len()),
        None => println!("Photo: none"),
    }
    if config.notifications.enabled {
        println!("Next reminder: {}", next_reminder.format("%a %Y-%m-%d %H:%M"));
    } else {
        println!("Notifications disabled");
    }
    Ok(())
}
