//! Today's time window for a class.
//!
//! The anchor's start and end times of day are laid onto the date of "now"
//! exactly as stored. An end earlier than the start is not shifted to the
//! next day here, so such a window is empty; only the meeting adjuster
//! interprets that shape as crossing midnight.

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Where "now" sits relative to today's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStatus {
    Before,
    During,
    After,
}

/// Today's window: the anchor times of day on `now`'s date.
pub fn todays_window(
    start_time: NaiveTime,
    end_time: NaiveTime,
    now: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let today = now.date();
    (today.and_time(start_time), today.and_time(end_time))
}

/// Classify `now` against today's window. Both window edges are inclusive.
pub fn window_status(
    start_time: NaiveTime,
    end_time: NaiveTime,
    now: NaiveDateTime,
) -> WindowStatus {
    let (window_start, window_end) = todays_window(start_time, end_time, now);
    if now < window_start {
        WindowStatus::Before
    } else if now <= window_end {
        WindowStatus::During
    } else {
        WindowStatus::After
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_status_before_during_after() {
        assert_eq!(window_status(t(9, 0), t(10, 0), at(8, 59, 59)), WindowStatus::Before);
        assert_eq!(window_status(t(9, 0), t(10, 0), at(9, 30, 0)), WindowStatus::During);
        assert_eq!(window_status(t(9, 0), t(10, 0), at(10, 0, 1)), WindowStatus::After);
    }

    #[test]
    fn test_edges_are_inclusive() {
        assert_eq!(window_status(t(9, 0), t(10, 0), at(9, 0, 0)), WindowStatus::During);
        assert_eq!(window_status(t(9, 0), t(10, 0), at(10, 0, 0)), WindowStatus::During);
    }

    #[test]
    fn test_window_uses_todays_date() {
        let (start, end) = todays_window(t(9, 0), t(10, 0), at(12, 0, 0));
        assert_eq!(start, at(9, 0, 0));
        assert_eq!(end, at(10, 0, 0));
    }

    #[test]
    fn test_midnight_crossing_is_not_normalized() {
        // 23:00–01:00 stays an inverted window on today's date.
        assert_eq!(window_status(t(23, 0), t(1, 0), at(22, 0, 0)), WindowStatus::Before);
        assert_eq!(window_status(t(23, 0), t(1, 0), at(23, 30, 0)), WindowStatus::After);
        assert_eq!(window_status(t(23, 0), t(1, 0), at(0, 30, 0)), WindowStatus::Before);
    }
}
