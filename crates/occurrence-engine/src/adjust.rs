//! Turning a requested class slot into a start time and duration a
//! conferencing provider will accept.
//!
//! Providers refuse meetings that start in the past, and stored anchors are
//! often days or months old. The start is therefore rebased onto today (or
//! pushed just past "now"), while the duration is taken from the times of day
//! alone. Date rollovers in the stored end instant cannot stretch or shrink
//! the meeting, and a class ending after midnight wraps to a positive length.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;

/// Seconds added to "now" when the requested start has already passed.
pub const START_BUFFER_SECS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const MILLIS_PER_MINUTE: i64 = 60 * 1000;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

// ── adjust_meeting_time ──────────────────────────────────────────────────────

/// A normalized meeting start and its length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeetingSlot {
    /// Never before "now".
    pub starts_at: NaiveDateTime,
    /// Exact length, in milliseconds, in `0..24h`.
    pub duration_ms: i64,
    /// Length in hours, rounded to two decimals for display.
    pub duration_hours: f64,
    /// Length in whole minutes, rounded up.
    pub duration_minutes: i64,
    /// Whether the start was pushed to "now" plus the buffer.
    pub buffered: bool,
}

impl MeetingSlot {
    /// The exact length as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }
}

/// Normalize a requested start/end pair against `now`.
///
/// The start is decided by the requested start's calendar date:
///
/// * earlier than today: its time of day is moved onto today. If that moment
///   has already passed, the meeting starts [`START_BUFFER_SECS`] after `now`.
/// * today: kept if still ahead of `now`, otherwise buffered the same way.
/// * later than today: kept unchanged.
///
/// The duration is the time-of-day difference from start to end, plus a day
/// when it is negative.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use occurrence_engine::adjust::adjust_meeting_time;
///
/// let yesterday = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
///
/// let slot = adjust_meeting_time(
///     yesterday.and_hms_opt(14, 0, 0).unwrap(),
///     yesterday.and_hms_opt(15, 30, 0).unwrap(),
///     today.and_hms_opt(10, 0, 0).unwrap(),
/// );
/// assert_eq!(slot.starts_at, today.and_hms_opt(14, 0, 0).unwrap());
/// assert_eq!(slot.duration_hours, 1.5);
/// ```
pub fn adjust_meeting_time(
    requested_start: NaiveDateTime,
    requested_end: NaiveDateTime,
    now: NaiveDateTime,
) -> MeetingSlot {
    let buffered_start = now + Duration::seconds(START_BUFFER_SECS);
    let requested_date = requested_start.date();
    let today = now.date();

    let (starts_at, buffered) = if requested_date < today {
        let candidate = today.and_time(requested_start.time());
        if candidate <= now {
            (buffered_start, true)
        } else {
            (candidate, false)
        }
    } else if requested_date == today {
        if requested_start <= now {
            (buffered_start, true)
        } else {
            (requested_start, false)
        }
    } else {
        (requested_start, false)
    };

    if buffered {
        tracing::debug!(
            %requested_start,
            %now,
            %starts_at,
            "requested start has passed, buffering"
        );
    } else if starts_at != requested_start {
        tracing::debug!(%requested_start, %starts_at, "rebased past start onto today");
    }

    let duration_ms = time_of_day_duration_ms(requested_start, requested_end);
    if duration_ms == 0 {
        tracing::warn!(
            %requested_start,
            %requested_end,
            "start and end share a time of day, meeting has zero length"
        );
    }

    MeetingSlot {
        starts_at,
        duration_ms,
        duration_hours: round_hours(duration_ms),
        duration_minutes: ceil_minutes(duration_ms),
        buffered,
    }
}

// ── Time-of-day arithmetic ───────────────────────────────────────────────────

/// Milliseconds since midnight of an instant's time of day.
pub fn time_of_day_millis(instant: NaiveDateTime) -> i64 {
    // Leap-second nanos (>= 1e9) are folded into the last millisecond.
    let millis = i64::from(instant.nanosecond().min(999_999_999) / 1_000_000);
    i64::from(instant.num_seconds_from_midnight()) * 1000 + millis
}

/// Time-of-day length from `start` to `end`, wrapping past midnight.
pub fn time_of_day_duration_ms(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let delta = time_of_day_millis(end) - time_of_day_millis(start);
    if delta < 0 {
        tracing::debug!(%start, %end, "class ends after midnight, wrapping duration");
        delta + MILLIS_PER_DAY
    } else {
        delta
    }
}

/// Milliseconds as hours, rounded to two decimals.
pub fn round_hours(ms: i64) -> f64 {
    (ms as f64 / MILLIS_PER_HOUR as f64 * 100.0).round() / 100.0
}

fn ceil_minutes(ms: i64) -> i64 {
    (ms + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE
}
