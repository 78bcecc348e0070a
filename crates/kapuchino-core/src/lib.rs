//! # Kapuchino Core Library
//!
//! This library provides the core logic for Kapuchino, a weekly "money
//! Thursday" reminder. The CLI binary and any GUI shell are thin layers over
//! the same core.
//!
//! ## Architecture
//!
//! - **Progress**: pure countdown to the next Thursday 09:00, driven by a
//!   [`Clock`] so weekday arithmetic is testable
//! - **State**: observable, write-through store for the message, cappuccino
//!   counter and photo
//! - **Notify**: weekly notification registration behind a scheduler trait
//! - **Photo**: cancellable load/compress pipeline for the motivational photo
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`compute_progress`]: Countdown computation
//! - [`ReminderStore`]: Reminder state and subscriptions
//! - [`NotificationManager`]: Permission and weekly scheduling flow
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod photo;
pub mod progress;
pub mod state;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, PhotoError, ValidationError};
pub use events::StateEvent;
pub use notify::{LocalScheduler, NotificationManager, NotificationScheduler, WeeklyReminder};
pub use photo::{compress_photo, load_photo, FilePhotoSource, PhotoOutcome, PhotoSource};
pub use progress::{compute_progress, compute_progress_for, Progress, WeeklyAnchor};
pub use state::{ReminderState, ReminderStore, SubscriptionId, DEFAULT_MESSAGE, RESET_MESSAGE};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
