//! Reminder state store.
//!
//! [`ReminderStore`] owns the persisted reminder fields (message, cappuccino
//! counter, photo) plus the derived countdown. Every mutator writes through to
//! the [`KeyValueStore`] before returning and then publishes a [`StateEvent`]
//! to subscribers, so the persisted and in-memory values never diverge.
//!
//! Writes are best-effort: a failed write is logged and the in-memory value is
//! still updated. Nothing is retried.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ReminderStore::load(Database::open()?, SystemClock);
//! store.subscribe(|event| println!("{event:?}"));
//! store.increment_counter();
//! store.refresh_progress();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{DatabaseError, PhotoError, ValidationError};
use crate::events::StateEvent;
use crate::photo::compress_photo;
use crate::progress::{compute_progress, Progress, INITIAL_LABEL};
use crate::storage::{KeyValueStore, PhotoConfig};

/// Message shown until the user edits it.
pub const DEFAULT_MESSAGE: &str = "Госпожа, не забудь капучино с корицей! ☕️ 💰";

/// Message restored by [`ReminderStore::reset_message`] and
/// [`ReminderStore::reset_all`].
pub const RESET_MESSAGE: &str = "Луиза, не забудь про денежный четверг! ☕️ 💰 🎉";

pub const MESSAGE_KEY: &str = "message";
pub const COUNT_KEY: &str = "cappuccinoCount";
pub const PHOTO_KEY: &str = "photo";

/// Snapshot of the reminder state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderState {
    pub message: String,
    pub cappuccino_count: u32,
    /// JPEG bytes of the motivational photo.
    #[serde(skip)]
    pub photo: Option<Vec<u8>>,
    pub progress_fraction: f64,
    pub progress_label: String,
}

impl Default for ReminderState {
    fn default() -> Self {
        Self {
            message: DEFAULT_MESSAGE.to_string(),
            cappuccino_count: 0,
            photo: None,
            progress_fraction: 0.0,
            progress_label: INITIAL_LABEL.to_string(),
        }
    }
}

/// Handle returned by [`ReminderStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&StateEvent) + Send>;

/// Observable, write-through reminder state.
pub struct ReminderStore<S, C> {
    kv: S,
    clock: C,
    photo_config: PhotoConfig,
    state: ReminderState,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore, C: Clock> ReminderStore<S, C> {
    /// Load persisted values from `kv`, falling back to defaults for keys
    /// that are absent or unreadable.
    pub fn load(kv: S, clock: C) -> Self {
        let mut state = ReminderState::default();

        match kv.get_text(MESSAGE_KEY) {
            Ok(Some(message)) => state.message = message,
            Ok(None) => {}
            Err(e) => warn!(key = MESSAGE_KEY, error = %e, "failed to read stored message"),
        }

        match kv.get_int(COUNT_KEY) {
            Ok(Some(n)) => match u32::try_from(n) {
                Ok(count) => state.cappuccino_count = count,
                Err(_) => warn!(key = COUNT_KEY, value = n, "stored counter out of range"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = COUNT_KEY, error = %e, "failed to read stored counter"),
        }

        match kv.get_blob(PHOTO_KEY) {
            Ok(Some(photo)) if !photo.is_empty() => state.photo = Some(photo),
            Ok(_) => {}
            Err(e) => warn!(key = PHOTO_KEY, error = %e, "failed to read stored photo"),
        }

        debug!(
            count = state.cappuccino_count,
            has_photo = state.photo.is_some(),
            "reminder state loaded"
        );

        Self {
            kv,
            clock,
            photo_config: PhotoConfig::default(),
            state,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Use `config` for photos set through [`Self::set_photo`].
    pub fn with_photo_config(mut self, config: PhotoConfig) -> Self {
        self.photo_config = config;
        self
    }

    pub fn photo_config(&self) -> &PhotoConfig {
        &self.photo_config
    }

    pub fn store(&self) -> &S {
        &self.kv
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn snapshot(&self) -> ReminderState {
        self.state.clone()
    }

    pub fn message(&self) -> &str {
        &self.state.message
    }

    pub fn cappuccino_count(&self) -> u32 {
        self.state.cappuccino_count
    }

    pub fn photo(&self) -> Option<&[u8]> {
        self.state.photo.as_deref()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.state.progress_fraction
    }

    pub fn progress_label(&self) -> &str {
        &self.state.progress_label
    }

    /// Register `observer` for every subsequent [`StateEvent`].
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&StateEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Replace the message with `text`, trimmed.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyMessage`] if `text` is empty after
    /// trimming. The stored message is unchanged in that case.
    pub fn set_message(&mut self, text: &str) -> Result<(), ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        self.write_message(trimmed.to_string());
        Ok(())
    }

    pub fn reset_message(&mut self) {
        self.write_message(RESET_MESSAGE.to_string());
    }

    fn write_message(&mut self, message: String) {
        persist(MESSAGE_KEY, self.kv.set_text(MESSAGE_KEY, &message));
        self.state.message = message.clone();
        let at = self.now_utc();
        self.publish(StateEvent::MessageChanged { message, at });
    }

    pub fn increment_counter(&mut self) {
        let count = self.state.cappuccino_count.saturating_add(1);
        self.write_count(count);
    }

    /// Decrement the counter, stopping at zero. At zero nothing is written.
    pub fn decrement_counter(&mut self) {
        if self.state.cappuccino_count == 0 {
            return;
        }
        let count = self.state.cappuccino_count - 1;
        self.write_count(count);
    }

    fn write_count(&mut self, count: u32) {
        persist(COUNT_KEY, self.kv.set_int(COUNT_KEY, i64::from(count)));
        self.state.cappuccino_count = count;
        let at = self.now_utc();
        self.publish(StateEvent::CounterChanged { count, at });
    }

    /// Compress `bytes` with the store's [`PhotoConfig`] and store the result.
    ///
    /// # Errors
    /// Returns an error if `bytes` is not a decodable image or re-encoding
    /// fails. The stored photo is unchanged in that case.
    pub fn set_photo(&mut self, bytes: &[u8]) -> Result<(), PhotoError> {
        let encoded = compress_photo(bytes, &self.photo_config)?;
        self.set_encoded_photo(encoded);
        Ok(())
    }

    /// Store bytes that have already been through [`compress_photo`].
    ///
    /// Empty input is ignored: an empty blob reads back as no photo.
    pub fn set_encoded_photo(&mut self, encoded: Vec<u8>) {
        if encoded.is_empty() {
            debug!("ignoring empty photo");
            return;
        }
        persist(PHOTO_KEY, self.kv.set_blob(PHOTO_KEY, &encoded));
        let bytes = encoded.len();
        self.state.photo = Some(encoded);
        let at = self.now_utc();
        self.publish(StateEvent::PhotoChanged { bytes, at });
    }

    pub fn remove_photo(&mut self) {
        persist(PHOTO_KEY, self.kv.remove(PHOTO_KEY));
        self.state.photo = None;
        let at = self.now_utc();
        self.publish(StateEvent::PhotoChanged { bytes: 0, at });
    }

    /// Restore message, counter and photo to their defaults and publish a
    /// single [`StateEvent::Reset`]. The reminder time is not part of this
    /// state and is left alone.
    pub fn reset_all(&mut self) {
        persist(MESSAGE_KEY, self.kv.set_text(MESSAGE_KEY, RESET_MESSAGE));
        persist(COUNT_KEY, self.kv.set_int(COUNT_KEY, 0));
        persist(PHOTO_KEY, self.kv.remove(PHOTO_KEY));

        self.state.message = RESET_MESSAGE.to_string();
        self.state.cappuccino_count = 0;
        self.state.photo = None;

        let at = self.now_utc();
        self.publish(StateEvent::Reset {
            message: RESET_MESSAGE.to_string(),
            at,
        });
    }

    /// The countdown at the clock's current instant, without publishing.
    pub fn progress(&self) -> Progress {
        compute_progress(&self.clock.now())
    }

    /// Recompute the countdown from the clock and publish it.
    /// Persisted fields are never touched.
    pub fn refresh_progress(&mut self) -> Progress {
        let now = self.clock.now();
        let progress = compute_progress(&now);
        self.state.progress_fraction = progress.fraction;
        self.state.progress_label = progress.label.clone();
        debug!(fraction = progress.fraction, "progress recomputed");

        self.publish(StateEvent::ProgressUpdated {
            fraction: progress.fraction,
            label: progress.label.clone(),
            at: now.with_timezone(&Utc),
        });
        progress
    }

    fn now_utc(&self) -> chrono::DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn publish(&self, event: StateEvent) {
        for (_, observer) in &self.observers {
            observer(&event);
        }
    }
}

fn persist(key: &str, result: Result<(), DatabaseError>) {
    if let Err(e) = result {
        warn!(key, error = %e, "failed to persist reminder state");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;

    fn wednesday_noon() -> FixedClock<Utc> {
        FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap())
    }

    fn recorder<S: KeyValueStore, C: Clock>(
        store: &mut ReminderStore<S, C>,
    ) -> Arc<Mutex<Vec<StateEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_text(&self, _: &str) -> Result<Option<String>, DatabaseError> {
            Err(DatabaseError::Locked)
        }
        fn set_text(&self, _: &str, _: &str) -> Result<(), DatabaseError> {
            Err(DatabaseError::Locked)
        }
        fn get_int(&self, _: &str) -> Result<Option<i64>, DatabaseError> {
            Err(DatabaseError::Locked)
        }
        fn set_int(&self, _: &str, _: i64) -> Result<(), DatabaseError> {
            Err(DatabaseError::Locked)
        }
        fn get_blob(&self, _: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
            Err(DatabaseError::Locked)
        }
        fn set_blob(&self, _: &str, _: &[u8]) -> Result<(), DatabaseError> {
            Err(DatabaseError::Locked)
        }
        fn remove(&self, _: &str) -> Result<(), DatabaseError> {
            Err(DatabaseError::Locked)
        }
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = ReminderStore::load(MemoryStore::new(), wednesday_noon());
        assert_eq!(store.snapshot(), ReminderState::default());
        assert_eq!(store.message(), DEFAULT_MESSAGE);
        assert_eq!(store.progress_label(), INITIAL_LABEL);
    }

    #[test]
    fn load_reads_persisted_values() {
        let kv = MemoryStore::new();
        kv.set_text(MESSAGE_KEY, "hello").unwrap();
        kv.set_int(COUNT_KEY, 4).unwrap();
        kv.set_blob(PHOTO_KEY, &[1, 2, 3]).unwrap();

        let store = ReminderStore::load(&kv, wednesday_noon());
        assert_eq!(store.message(), "hello");
        assert_eq!(store.cappuccino_count(), 4);
        assert_eq!(store.photo(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn negative_stored_counter_falls_back_to_zero() {
        let kv = MemoryStore::new();
        kv.set_int(COUNT_KEY, -3).unwrap();
        let store = ReminderStore::load(&kv, wednesday_noon());
        assert_eq!(store.cappuccino_count(), 0);
    }

    #[test]
    fn set_message_trims_and_persists() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        let events = recorder(&mut store);

        store.set_message("  see you on Thursday \n").unwrap();

        assert_eq!(store.message(), "see you on Thursday");
        assert_eq!(
            kv.get_text(MESSAGE_KEY).unwrap().as_deref(),
            Some("see you on Thursday")
        );
        let events = events.lock().unwrap();
        assert!(matches!(
            &events[..],
            [StateEvent::MessageChanged { message, .. }] if message == "see you on Thursday"
        ));
    }

    #[test]
    fn blank_message_is_rejected() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        let events = recorder(&mut store);

        assert_eq!(store.set_message(""), Err(ValidationError::EmptyMessage));
        assert_eq!(store.set_message(" \t\n"), Err(ValidationError::EmptyMessage));

        assert_eq!(store.message(), DEFAULT_MESSAGE);
        assert!(!kv.contains(MESSAGE_KEY));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn reset_message_uses_reset_text() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        store.set_message("custom").unwrap();
        store.reset_message();
        assert_eq!(store.message(), RESET_MESSAGE);
        assert_eq!(kv.get_text(MESSAGE_KEY).unwrap().as_deref(), Some(RESET_MESSAGE));
    }

    #[test]
    fn counter_increments_and_floors_at_zero() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());

        store.increment_counter();
        store.increment_counter();
        assert_eq!(store.cappuccino_count(), 2);
        assert_eq!(kv.get_int(COUNT_KEY).unwrap(), Some(2));

        store.decrement_counter();
        store.decrement_counter();
        store.decrement_counter();
        assert_eq!(store.cappuccino_count(), 0);
        assert_eq!(kv.get_int(COUNT_KEY).unwrap(), Some(0));
    }

    #[test]
    fn decrement_at_zero_is_silent() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        let events = recorder(&mut store);

        store.decrement_counter();

        assert_eq!(store.cappuccino_count(), 0);
        assert!(!kv.contains(COUNT_KEY));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn encoded_photo_is_stored_and_removed() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        let events = recorder(&mut store);

        store.set_encoded_photo(vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(kv.get_blob(PHOTO_KEY).unwrap().map(|b| b.len()), Some(4));

        store.remove_photo();
        assert!(store.photo().is_none());
        assert!(!kv.contains(PHOTO_KEY));

        let events = events.lock().unwrap();
        assert!(matches!(
            &events[..],
            [
                StateEvent::PhotoChanged { bytes: 4, .. },
                StateEvent::PhotoChanged { bytes: 0, .. }
            ]
        ));
    }

    #[test]
    fn undecodable_photo_leaves_store_unchanged() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        store.set_encoded_photo(vec![9, 9, 9]);

        let err = store.set_photo(b"definitely not an image").unwrap_err();

        assert!(matches!(err, PhotoError::Decode(_)));
        assert_eq!(store.photo(), Some(&[9u8, 9, 9][..]));
        assert_eq!(kv.get_blob(PHOTO_KEY).unwrap(), Some(vec![9, 9, 9]));
    }

    #[test]
    fn reset_all_restores_every_field_in_one_event() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        store.set_message("custom").unwrap();
        store.increment_counter();
        store.set_encoded_photo(vec![1, 2, 3]);
        let events = recorder(&mut store);

        store.reset_all();

        assert_eq!(store.message(), RESET_MESSAGE);
        assert_eq!(store.cappuccino_count(), 0);
        assert!(store.photo().is_none());
        assert_eq!(kv.get_int(COUNT_KEY).unwrap(), Some(0));
        assert!(!kv.contains(PHOTO_KEY));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn refresh_progress_uses_the_injected_clock() {
        let kv = MemoryStore::new();
        let clock = wednesday_noon();
        let mut store = ReminderStore::load(&kv, clock);
        let events = recorder(&mut store);

        let progress = store.refresh_progress();

        assert_eq!(progress.remaining_secs, 21 * 3600);
        assert_eq!(store.progress_label(), "До следующего четверга: 21 ч. 0 мин. ⏳");
        assert!((store.progress_fraction() - progress.fraction).abs() < f64::EPSILON);
        assert!(matches!(
            &events.lock().unwrap()[..],
            [StateEvent::ProgressUpdated { .. }]
        ));
        // Derived values are never persisted.
        assert!(!kv.contains(MESSAGE_KEY));
        assert!(!kv.contains(COUNT_KEY));
    }

    #[test]
    fn refresh_reaches_terminal_state_when_clock_hits_anchor() {
        let mut store = ReminderStore::load(MemoryStore::new(), wednesday_noon());
        store.clock().advance(chrono::Duration::hours(21));

        let progress = store.refresh_progress();

        assert!(progress.is_terminal());
        assert_eq!(store.progress_fraction(), 1.0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut store = ReminderStore::load(MemoryStore::new(), wednesday_noon());
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.increment_counter();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.increment_counter();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn empty_encoded_photo_is_ignored() {
        let kv = MemoryStore::new();
        let mut store = ReminderStore::load(&kv, wednesday_noon());
        store.set_encoded_photo(vec![7, 7]);
        let events = recorder(&mut store);

        store.set_encoded_photo(Vec::new());

        assert_eq!(store.photo(), Some(&[7u8, 7][..]));
        assert_eq!(kv.get_blob(PHOTO_KEY).unwrap(), Some(vec![7, 7]));
        assert!(events.lock().unwrap().is_empty());
        let reloaded = ReminderStore::load(&kv, wednesday_noon());
        assert_eq!(reloaded.photo(), store.photo());
    }

    #[test]
    fn failed_writes_are_not_surfaced() {
        let mut store = ReminderStore::load(BrokenStore, wednesday_noon());
        let events = recorder(&mut store);

        store.set_message("still works").unwrap();
        store.increment_counter();
        store.remove_photo();
        store.reset_all();

        assert_eq!(store.message(), RESET_MESSAGE);
        assert_eq!(events.lock().unwrap().len(), 4);
    }
}
