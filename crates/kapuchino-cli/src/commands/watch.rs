use std::time::Duration;

use clap::Args;
use kapuchino_core::{Config, StateEvent};

use super::{open_store, CliResult};
use crate::commands::status::render_bar;

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (defaults to watch.interval_secs)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,
    /// Stop after this many refreshes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    ticks: Option<u64>,
    /// Print each refresh as a JSON event
    #[arg(long)]
    json: bool,
}

pub async fn run(args: WatchArgs) -> CliResult {
    let config = Config::load()?;
    let mut store = open_store(&config)?;
    let interval_secs = args.interval.unwrap_or(config.watch.interval_secs);

    let json = args.json;
    store.subscribe(move |event| {
        if let StateEvent::ProgressUpdated {
            fraction, label, ..
        } = event
        {
            if json {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
                }
            } else {
                println!("{label} {}", render_bar(*fraction));
            }
        }
    });

    // The first tick completes immediately.
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let mut remaining = args.ticks;
    loop {
        interval.tick().await;
        store.refresh_progress();

        if let Some(n) = remaining.as_mut() {
            *n -= 1;
            if *n == 0 {
                break;
            }
        }
    }
    Ok(())
}
