use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every change to the reminder state produces a StateEvent.
/// Subscribers of [`crate::ReminderStore`] receive them synchronously,
/// after the change has been applied and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateEvent {
    MessageChanged {
        message: String,
        at: DateTime<Utc>,
    },
    CounterChanged {
        count: u32,
        at: DateTime<Utc>,
    },
    /// Photo replaced (`bytes > 0`) or removed (`bytes == 0`).
    PhotoChanged {
        bytes: usize,
        at: DateTime<Utc>,
    },
    ProgressUpdated {
        fraction: f64,
        label: String,
        at: DateTime<Utc>,
    },
    /// Message, counter and photo restored to their defaults at once.
    Reset {
        message: String,
        at: DateTime<Utc>,
    },
}
