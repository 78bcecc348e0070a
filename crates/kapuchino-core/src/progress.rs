//! "Time until next Thursday" countdown.
//!
//! The countdown targets a weekly anchor (Thursday 09:00 local time by
//! default) and reports how much of the surrounding 7-day cycle has elapsed.
//!
//! ## Anchor search
//!
//! ```text
//! today == anchor weekday, time <= anchor time  -> today at anchor time
//! today == anchor weekday, time >  anchor time  -> same weekday, +7 days
//! any other weekday                             -> next matching weekday
//! ```
//!
//! When the remaining duration is zero or negative the countdown is in its
//! terminal state: fraction saturates at 1.0 and the label announces the day.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeZone, Weekday,
};
use serde::{Deserialize, Serialize};

/// Length of one countdown cycle in seconds.
pub const WEEK_SECS: i64 = 7 * 24 * 3600;

/// Label shown before the first recomputation.
pub const INITIAL_LABEL: &str = "До следующего четверга:";

/// Label shown once the anchor has been reached.
pub const TERMINAL_LABEL: &str = "Сегодня четверг! ☕️";

/// A weekday and local time of day that recurs every week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAnchor {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl Default for WeeklyAnchor {
    /// Thursday, 09:00.
    fn default() -> Self {
        Self {
            weekday: Weekday::Thu,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl WeeklyAnchor {
    pub fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    /// The first anchor instant at or after `now`.
    pub fn next_at_or_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let local = now.naive_local();
        let today = local.date();
        let current = i64::from(today.weekday().num_days_from_monday());
        let target = i64::from(self.weekday.num_days_from_monday());

        let days_ahead = if current == target {
            if local.time() <= self.time {
                0
            } else {
                7
            }
        } else {
            (target - current + 7) % 7
        };

        let naive = (today + Duration::days(days_ahead)).and_time(self.time);
        resolve_local(now, naive)
    }

    /// The first anchor instant strictly after `now`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let candidate = self.next_at_or_after(now);
        if candidate <= *now {
            let naive = (candidate.naive_local().date() + Duration::days(7)).and_time(self.time);
            resolve_local(now, naive)
        } else {
            candidate
        }
    }
}

/// Maps a local wall-clock time onto `now`'s time zone.
///
/// Ambiguous times take the earliest mapping. Times that do not exist (a DST
/// gap) are placed using the UTC offset in effect at `now`.
pub(crate) fn resolve_local<Tz: TimeZone>(
    now: &DateTime<Tz>,
    naive: NaiveDateTime,
) -> DateTime<Tz> {
    let tz = now.timezone();
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => {
            let offset = i64::from(now.offset().fix().local_minus_utc());
            tz.from_utc_datetime(&(naive - Duration::seconds(offset)))
        }
    }
}

/// Result of a countdown computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Share of the week elapsed, in [0, 1].
    pub fraction: f64,
    /// Human-readable countdown.
    pub label: String,
    /// The anchor the countdown targets.
    pub anchor: DateTime<FixedOffset>,
    /// Whole seconds until the anchor, rounded up; zero or negative only in
    /// the terminal state.
    pub remaining_secs: i64,
}

impl Progress {
    pub fn is_terminal(&self) -> bool {
        self.remaining_secs <= 0
    }
}

/// Countdown to the next Thursday 09:00 in `now`'s time zone.
pub fn compute_progress<Tz: TimeZone>(now: &DateTime<Tz>) -> Progress {
    compute_progress_for(&WeeklyAnchor::default(), now)
}

/// Countdown to the next occurrence of `anchor` in `now`'s time zone.
pub fn compute_progress_for<Tz: TimeZone>(anchor: &WeeklyAnchor, now: &DateTime<Tz>) -> Progress {
    let target = anchor.next_at_or_after(now);
    let remaining = target.clone().signed_duration_since(now.clone());
    let anchor_fixed = target.fixed_offset();

    if remaining <= Duration::zero() {
        return Progress {
            fraction: 1.0,
            label: TERMINAL_LABEL.to_string(),
            anchor: anchor_fixed,
            remaining_secs: remaining.num_seconds(),
        };
    }

    let remaining_secs_f = remaining
        .num_nanoseconds()
        .map_or(remaining.num_seconds() as f64, |n| n as f64 / 1e9);
    let fraction = (1.0 - remaining_secs_f / WEEK_SECS as f64).clamp(0.0, 1.0);

    let whole = remaining.num_seconds();
    let remaining_secs = if remaining > Duration::seconds(whole) {
        whole + 1
    } else {
        whole
    };

    Progress {
        fraction,
        label: format_remaining(whole),
        anchor: anchor_fixed,
        remaining_secs,
    }
}

/// Renders a positive remaining duration, omitting days when zero.
pub fn format_remaining(total_secs: i64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;

    if days > 0 {
        format!("{INITIAL_LABEL} {days} дн. {hours} ч. {minutes} мин. ⏳")
    } else {
        format!("{INITIAL_LABEL} {hours} ч. {minutes} мин. ⏳")
    }
}
