mod config;
pub mod database;
pub mod kv;
pub mod memory;

pub use config::{Config, NotificationsConfig, PhotoConfig, ReminderConfig, WatchConfig};
pub use database::Database;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `KAPUCHINO_DATA_DIR` overrides the location entirely. Otherwise the
/// directory is `~/.config/kapuchino[-dev]/`, with the `-dev` suffix chosen
/// by `KAPUCHINO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("KAPUCHINO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("KAPUCHINO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("kapuchino-dev")
            } else {
                base_dir.join("kapuchino")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
