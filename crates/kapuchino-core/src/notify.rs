//! Weekly reminder notifications.
//!
//! The reminder is one recurring trigger, every Thursday at the configured
//! time of day, registered under a fixed identifier. Its title and body are
//! fixed at registration time: editing the message in the
//! [`ReminderStore`](crate::ReminderStore) does not re-register it.
//!
//! Backends implement [`NotificationScheduler`]. [`LocalScheduler`] keeps
//! registrations in the key-value store; [`NotificationManager`] drives the
//! permission-then-schedule flow on top of any backend.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::NotifyError;
use crate::progress::WeeklyAnchor;
use crate::storage::KeyValueStore;

pub const REMINDER_ID: &str = "kapuchino_reminder";
pub const REMINDER_TITLE: &str = "☕ Kapuchino";
pub const REMINDER_BODY: &str = "Госпожа, не забудь капучино с корицей! ☕️ 💰";

/// Key under which [`LocalScheduler`] keeps its registrations.
pub const SCHEDULE_KEY: &str = "notification_schedule";

/// A recurring weekly notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReminder {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl WeeklyReminder {
    /// The Thursday reminder at `time`.
    pub fn thursday(time: NaiveTime) -> Self {
        Self {
            identifier: REMINDER_ID.to_string(),
            title: REMINDER_TITLE.to_string(),
            body: REMINDER_BODY.to_string(),
            weekday: Weekday::Thu,
            time,
        }
    }

    pub fn anchor(&self) -> WeeklyAnchor {
        WeeklyAnchor::new(self.weekday, self.time)
    }

    /// The next time this reminder fires, strictly after `now`.
    pub fn next_fire_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        self.anchor().next_after(now)
    }
}

/// A platform notification backend.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Ask the user for permission to post notifications.
    ///
    /// May stay pending until the user answers; there is no timeout.
    async fn request_permission(&self) -> bool;

    /// Register `reminder`, replacing any registration with the same
    /// identifier.
    async fn schedule_weekly(&self, reminder: &WeeklyReminder) -> Result<(), NotifyError>;

    /// Currently registered reminders.
    async fn pending(&self) -> Result<Vec<WeeklyReminder>, NotifyError>;

    /// Remove the registration for `identifier`, if any.
    async fn cancel(&self, identifier: &str) -> Result<(), NotifyError>;
}

/// Scheduler that records registrations in a [`KeyValueStore`] as JSON.
///
/// Permission is answered from configuration rather than a prompt.
pub struct LocalScheduler<S> {
    store: Mutex<S>,
    permission: bool,
}

impl<S: KeyValueStore> LocalScheduler<S> {
    pub fn new(store: S, permission: bool) -> Self {
        Self {
            store: Mutex::new(store),
            permission,
        }
    }

    fn registration_error(identifier: &str, message: impl ToString) -> NotifyError {
        NotifyError::RegistrationFailed {
            identifier: identifier.to_string(),
            message: message.to_string(),
        }
    }

    fn read(&self, store: &S) -> Result<BTreeMap<String, WeeklyReminder>, NotifyError> {
        let json = store
            .get_text(SCHEDULE_KEY)
            .map_err(|e| Self::registration_error(SCHEDULE_KEY, e))?;
        match json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| Self::registration_error(SCHEDULE_KEY, e)),
            None => Ok(BTreeMap::new()),
        }
    }

    fn write(
        &self,
        store: &S,
        registrations: &BTreeMap<String, WeeklyReminder>,
    ) -> Result<(), NotifyError> {
        let json = serde_json::to_string(registrations)
            .map_err(|e| Self::registration_error(SCHEDULE_KEY, e))?;
        store
            .set_text(SCHEDULE_KEY, &json)
            .map_err(|e| Self::registration_error(SCHEDULE_KEY, e))
    }
}

#[async_trait]
impl<S: KeyValueStore + Send> NotificationScheduler for LocalScheduler<S> {
    async fn request_permission(&self) -> bool {
        self.permission
    }

    async fn schedule_weekly(&self, reminder: &WeeklyReminder) -> Result<(), NotifyError> {
        if !self.permission {
            return Err(NotifyError::NotAuthorized);
        }
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let mut registrations = self.read(&store)?;
        registrations.insert(reminder.identifier.clone(), reminder.clone());
        self.write(&store, &registrations)?;
        debug!(identifier = %reminder.identifier, "weekly reminder stored");
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<WeeklyReminder>, NotifyError> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read(&store)?.into_values().collect())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), NotifyError> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let mut registrations = self.read(&store)?;
        if registrations.remove(identifier).is_some() {
            self.write(&store, &registrations)?;
        }
        Ok(())
    }
}

/// Tracks permission and keeps the Thursday reminder registered.
pub struct NotificationManager<N> {
    scheduler: N,
    authorized: bool,
    time: NaiveTime,
}

impl<N: NotificationScheduler> NotificationManager<N> {
    pub fn new(scheduler: N, time: NaiveTime) -> Self {
        Self {
            scheduler,
            authorized: false,
            time,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn reminder_time(&self) -> NaiveTime {
        self.time
    }

    pub fn scheduler(&self) -> &N {
        &self.scheduler
    }

    /// The reminder this manager registers.
    pub fn reminder(&self) -> WeeklyReminder {
        WeeklyReminder::thursday(self.time)
    }

    /// Ask for permission and, when granted, register the reminder.
    ///
    /// On deny any earlier registration is removed, so a stale reminder never
    /// fires at a time that is no longer configured. Registration failures are
    /// logged; the answer is still reported.
    pub async fn request_permission(&mut self) -> bool {
        let granted = self.scheduler.request_permission().await;
        self.authorized = granted;
        if granted {
            if let Err(e) = self.schedule().await {
                warn!(error = %e, "failed to schedule reminder after permission grant");
            }
        } else {
            info!("notification permission denied");
            if let Err(e) = self.scheduler.cancel(REMINDER_ID).await {
                warn!(error = %e, "failed to remove reminder after permission deny");
            }
        }
        granted
    }

    /// Register the reminder at the current time of day.
    ///
    /// # Errors
    /// Returns [`NotifyError::NotAuthorized`] before permission is granted.
    pub async fn schedule(&self) -> Result<(), NotifyError> {
        if !self.authorized {
            return Err(NotifyError::NotAuthorized);
        }
        let reminder = self.reminder();
        self.scheduler.schedule_weekly(&reminder).await?;
        info!(
            identifier = %reminder.identifier,
            time = %reminder.time.format("%H:%M"),
            "weekly reminder scheduled"
        );
        Ok(())
    }

    /// Change the time of day, re-registering when authorized.
    ///
    /// Returns whether the reminder was registered.
    pub async fn reschedule(&mut self, time: NaiveTime) -> Result<bool, NotifyError> {
        self.time = time;
        if !self.authorized {
            debug!("reminder time changed without permission; not registered");
            return Ok(false);
        }
        self.schedule().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn next_fire_is_strictly_after_now() {
        let reminder = WeeklyReminder::thursday(nine());
        let at_anchor = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2026, 10, 15, 8, 59, 0).unwrap();

        assert_eq!(
            reminder.next_fire_after(&at_anchor),
            Utc.with_ymd_and_hms(2026, 10, 22, 9, 0, 0).unwrap()
        );
        assert_eq!(
            reminder.next_fire_after(&before),
            Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn scheduling_twice_replaces_the_registration() {
        let scheduler = LocalScheduler::new(MemoryStore::new(), true);
        scheduler
            .schedule_weekly(&WeeklyReminder::thursday(nine()))
            .await
            .unwrap();
        let evening = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
        scheduler
            .schedule_weekly(&WeeklyReminder::thursday(evening))
            .await
            .unwrap();

        let pending = scheduler.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].time, evening);
    }

    #[tokio::test]
    async fn cancel_removes_registration() {
        let scheduler = LocalScheduler::new(MemoryStore::new(), true);
        scheduler
            .schedule_weekly(&WeeklyReminder::thursday(nine()))
            .await
            .unwrap();
        scheduler.cancel(REMINDER_ID).await.unwrap();
        scheduler.cancel(REMINDER_ID).await.unwrap();
        assert!(scheduler.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn manager_schedules_after_grant() {
        let mut manager =
            NotificationManager::new(LocalScheduler::new(MemoryStore::new(), true), nine());
        assert!(manager.request_permission().await);
        assert!(manager.is_authorized());

        let pending = manager.scheduler().pending().await.unwrap();
        assert_eq!(pending, vec![WeeklyReminder::thursday(nine())]);
    }

    #[tokio::test]
    async fn manager_does_not_schedule_when_denied() {
        let mut manager =
            NotificationManager::new(LocalScheduler::new(MemoryStore::new(), false), nine());
        assert!(!manager.request_permission().await);
        assert!(matches!(manager.schedule().await, Err(NotifyError::NotAuthorized)));
        assert!(!manager.reschedule(nine()).await.unwrap());
        assert!(manager.scheduler().pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reschedule_moves_the_reminder() {
        let mut manager =
            NotificationManager::new(LocalScheduler::new(MemoryStore::new(), true), nine());
        manager.request_permission().await;
        let evening = NaiveTime::from_hms_opt(20, 15, 0).unwrap();

        assert!(manager.reschedule(evening).await.unwrap());

        let pending = manager.scheduler().pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].time, evening);
        assert_eq!(pending[0].weekday, Weekday::Thu);
    }

    #[tokio::test]
    async fn deny_removes_an_earlier_registration() {
        let store = MemoryStore::new();
        LocalScheduler::new(&store, true)
            .schedule_weekly(&WeeklyReminder::thursday(nine()))
            .await
            .unwrap();

        let mut manager = NotificationManager::new(LocalScheduler::new(&store, false), nine());
        assert!(!manager.request_permission().await);
        assert!(manager.scheduler().pending().await.unwrap().is_empty());
    }

    #[test]
    fn reminder_body_is_fixed() {
        let reminder = WeeklyReminder::thursday(nine());
        assert_eq!(reminder.title, REMINDER_TITLE);
        assert_eq!(reminder.body, REMINDER_BODY);
        assert_eq!(reminder.identifier, REMINDER_ID);
    }
}
