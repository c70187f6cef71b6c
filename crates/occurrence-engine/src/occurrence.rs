//! Deciding whether a class occurs on a calendar date.
//!
//! The anchor is the single stored occurrence of a class. Without a pattern
//! the class happens on the anchor's date only. With a pattern, occurrences
//! are projected forward from the anchor's date and never precede it.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};
use crate::pattern::Pattern;

// ── ScheduleAnchor ───────────────────────────────────────────────────────────

/// The canonical single occurrence of a class.
///
/// `end`'s time of day may be earlier than `start`'s, which reads as a class
/// ending after midnight. Only the time-of-day part of `end` is ever used for
/// durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleAnchor {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ScheduleAnchor {
    /// Anchor a class at `start`..`end`. `end` is not required to follow
    /// `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// The date of the first occurrence; patterns project from here.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Start of each day's window.
    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    /// End of each day's window.
    pub fn end_time(&self) -> NaiveTime {
        self.end.time()
    }
}

// ── Month-end policy ─────────────────────────────────────────────────────────

/// What a monthly pattern does in a month that lacks the anchor's day
/// (e.g. an anchor on the 31st, evaluated in April).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthEndPolicy {
    /// Occur on the last day of the shorter month.
    #[default]
    Clamp,
    /// No occurrence in the shorter month.
    Skip,
    /// Report [`EngineError::AmbiguousMonthlyAnchor`].
    Reject,
}

impl FromStr for MonthEndPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(MonthEndPolicy::Clamp),
            "skip" => Ok(MonthEndPolicy::Skip),
            "reject" => Ok(MonthEndPolicy::Reject),
            other => Err(EngineError::InvalidMonthEndPolicy(format!(
                "'{other}' (expected clamp, skip or reject)"
            ))),
        }
    }
}

impl fmt::Display for MonthEndPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MonthEndPolicy::Clamp => "clamp",
            MonthEndPolicy::Skip => "skip",
            MonthEndPolicy::Reject => "reject",
        })
    }
}

/// Options for [`occurs_on_with_options`] and the functions built on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluateOptions {
    pub month_end: MonthEndPolicy,
}

// ── occurs_on ────────────────────────────────────────────────────────────────

/// Whether a class occurs on `target`, using default options.
///
/// The default month-end policy is [`MonthEndPolicy::Clamp`], which always
/// resolves, so this cannot fail.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use occurrence_engine::occurrence::{occurs_on, ScheduleAnchor};
/// use occurrence_engine::pattern::Pattern;
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(); // Monday
/// let anchor = ScheduleAnchor::new(
///     day.and_hms_opt(9, 0, 0).unwrap(),
///     day.and_hms_opt(10, 0, 0).unwrap(),
/// );
/// let biweekly = Pattern::parse("weekly:2").unwrap();
///
/// assert!(occurs_on(&anchor, Some(&biweekly), NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()));
/// assert!(!occurs_on(&anchor, Some(&biweekly), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()));
/// ```
pub fn occurs_on(anchor: &ScheduleAnchor, pattern: Option<&Pattern>, target: NaiveDate) -> bool {
    match occurs_on_with_options(anchor, pattern, target, &EvaluateOptions::default()) {
        Ok(occurs) => occurs,
        Err(err) => unreachable!("clamp month-end policy cannot fail: {err}"),
    }
}

/// Whether a class occurs on `target`.
///
/// # Errors
///
/// Returns [`EngineError::AmbiguousMonthlyAnchor`] only under
/// [`MonthEndPolicy::Reject`], for a monthly pattern whose in-cadence target
/// month is shorter than the anchor's day of month.
pub fn occurs_on_with_options(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    target: NaiveDate,
    options: &EvaluateOptions,
) -> Result<bool> {
    let start = anchor.start_date();

    let Some(pattern) = pattern else {
        return Ok(target == start);
    };

    if target < start {
        return Ok(false);
    }
    let days_since_start = (target - start).num_days();

    let occurs = match pattern {
        Pattern::Daily(n) => days_since_start % i64::from(n.get()) == 0,
        Pattern::Weekly(n) => {
            let weeks_since_start = days_since_start / 7;
            weeks_since_start % i64::from(n.get()) == 0 && target.weekday() == start.weekday()
        }
        Pattern::Monthly(n) => {
            let months = months_between(start, target);
            if months % i64::from(n.get()) != 0 {
                false
            } else {
                match monthly_day(start.day(), target.year(), target.month(), options.month_end)? {
                    Some(day) => target.day() == day,
                    None => false,
                }
            }
        }
        Pattern::Weekdays(_) => is_weekday(target.weekday()),
        Pattern::Custom(_, days) => days.contains(target.weekday()),
    };

    Ok(occurs)
}

// ── Calendar helpers ─────────────────────────────────────────────────────────

/// Monday through Friday.
pub(crate) fn is_weekday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Calendar month distance from `from` to `to`, ignoring days.
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Number of days in a month.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .unwrap_or(28)
}

/// The day a monthly occurrence falls on in `year`-`month`, given the
/// anchor's day of month. `None` means the month is skipped.
pub(crate) fn monthly_day(
    anchor_day: u32,
    year: i32,
    month: u32,
    policy: MonthEndPolicy,
) -> Result<Option<u32>> {
    let last = last_day_of_month(year, month);
    if anchor_day <= last {
        return Ok(Some(anchor_day));
    }
    match policy {
        MonthEndPolicy::Clamp => {
            tracing::debug!(
                anchor_day,
                year,
                month,
                last,
                "clamping monthly occurrence to month end"
            );
            Ok(Some(last))
        }
        MonthEndPolicy::Skip => Ok(None),
        MonthEndPolicy::Reject => Err(EngineError::AmbiguousMonthlyAnchor {
            anchor_day,
            year,
            month,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Monday, March 2, 2026, 09:00–10:00.
    fn monday_anchor() -> ScheduleAnchor {
        let day = date(2026, 3, 2);
        ScheduleAnchor::new(
            day.and_hms_opt(9, 0, 0).unwrap(),
            day.and_hms_opt(10, 0, 0).unwrap(),
        )
    }

    fn anchor_on(day: NaiveDate) -> ScheduleAnchor {
        ScheduleAnchor::new(
            day.and_hms_opt(18, 30, 0).unwrap(),
            day.and_hms_opt(20, 0, 0).unwrap(),
        )
    }

    fn p(s: &str) -> Pattern {
        Pattern::parse(s).unwrap()
    }

    #[test]
    fn test_no_pattern_only_anchor_date() {
        let anchor = monday_anchor();
        assert!(occurs_on(&anchor, None, date(2026, 3, 2)));
        assert!(!occurs_on(&anchor, None, date(2026, 3, 1)));
        assert!(!occurs_on(&anchor, None, date(2026, 3, 3)));
        assert!(!occurs_on(&anchor, None, date(2026, 3, 9)));
    }

    #[test]
    fn test_pattern_never_before_anchor() {
        let anchor = monday_anchor();
        let all_kinds = [
            "daily:1",
            "weekly:1",
            "monthly:1",
            "weekdays:1",
            "custom:1:0,1,2,3,4,5,6",
        ];
        for pattern in all_kinds {
            assert!(
                !occurs_on(&anchor, Some(&p(pattern)), date(2026, 2, 23)),
                "{pattern}"
            );
        }
    }

    #[test]
    fn test_daily_interval() {
        let anchor = monday_anchor();
        let every_third = p("daily:3");
        assert!(occurs_on(&anchor, Some(&every_third), date(2026, 3, 2)));
        assert!(!occurs_on(&anchor, Some(&every_third), date(2026, 3, 3)));
        assert!(!occurs_on(&anchor, Some(&every_third), date(2026, 3, 4)));
        assert!(occurs_on(&anchor, Some(&every_third), date(2026, 3, 5)));
        assert!(occurs_on(&anchor, Some(&every_third), date(2026, 3, 8)));
    }

    #[test]
    fn test_weekly_every_other_monday() {
        let anchor = monday_anchor();
        let biweekly = p("weekly:2");
        assert!(occurs_on(&anchor, Some(&biweekly), date(2026, 3, 2)));
        assert!(!occurs_on(&anchor, Some(&biweekly), date(2026, 3, 9)));
        assert!(occurs_on(&anchor, Some(&biweekly), date(2026, 3, 16)));
        // Right week parity, wrong weekday.
        assert!(!occurs_on(&anchor, Some(&biweekly), date(2026, 3, 17)));
    }

    #[test]
    fn test_weekdays_ignores_anchor_weekday() {
        // Anchor on a Saturday; weekdays still means Mon-Fri.
        let anchor = anchor_on(date(2026, 3, 7));
        let weekdays = p("weekdays:1");
        assert!(!occurs_on(&anchor, Some(&weekdays), date(2026, 3, 7)));
        assert!(!occurs_on(&anchor, Some(&weekdays), date(2026, 3, 8)));
        for d in 9..=13 {
            assert!(occurs_on(&anchor, Some(&weekdays), date(2026, 3, d)), "day {d}");
        }
    }

    #[test]
    fn test_custom_mon_wed_fri() {
        let anchor = monday_anchor();
        let mwf = p("custom:1:1,3,5");
        let hits: Vec<u32> = (2..=8)
            .filter(|d| occurs_on(&anchor, Some(&mwf), date(2026, 3, *d)))
            .collect();
        assert_eq!(hits, vec![2, 4, 6]);
    }

    #[test]
    fn test_monthly_same_day_of_month() {
        let anchor = anchor_on(date(2026, 1, 15));
        let quarterly = p("monthly:3");
        assert!(occurs_on(&anchor, Some(&quarterly), date(2026, 4, 15)));
        assert!(occurs_on(&anchor, Some(&quarterly), date(2027, 1, 15)));
        assert!(!occurs_on(&anchor, Some(&quarterly), date(2026, 2, 15)));
        assert!(!occurs_on(&anchor, Some(&quarterly), date(2026, 4, 16)));
    }

    #[test]
    fn test_monthly_clamps_to_month_end_by_default() {
        let anchor = anchor_on(date(2026, 1, 31));
        let monthly = p("monthly:1");
        assert!(occurs_on(&anchor, Some(&monthly), date(2026, 2, 28)));
        assert!(!occurs_on(&anchor, Some(&monthly), date(2026, 2, 27)));
        assert!(occurs_on(&anchor, Some(&monthly), date(2026, 4, 30)));
        assert!(occurs_on(&anchor, Some(&monthly), date(2026, 3, 31)));
        assert!(!occurs_on(&anchor, Some(&monthly), date(2026, 3, 30)));
        // Leap year February.
        assert!(occurs_on(&anchor, Some(&monthly), date(2028, 2, 29)));
    }

    #[test]
    fn test_monthly_skip_policy() {
        let anchor = anchor_on(date(2026, 1, 31));
        let monthly = p("monthly:1");
        let options = EvaluateOptions {
            month_end: MonthEndPolicy::Skip,
        };
        for target in [date(2026, 2, 28), date(2026, 4, 30)] {
            assert!(!occurs_on_with_options(&anchor, Some(&monthly), target, &options).unwrap());
        }
        let march = date(2026, 3, 31);
        assert!(occurs_on_with_options(&anchor, Some(&monthly), march, &options).unwrap());
    }

    #[test]
    fn test_monthly_reject_policy() {
        let anchor = anchor_on(date(2026, 1, 31));
        let monthly = p("monthly:1");
        let options = EvaluateOptions {
            month_end: MonthEndPolicy::Reject,
        };
        let err = occurs_on_with_options(&anchor, Some(&monthly), date(2026, 4, 10), &options)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::AmbiguousMonthlyAnchor {
                anchor_day: 31,
                year: 2026,
                month: 4,
            }
        );
        // Out-of-cadence months never reach the ambiguity.
        let bimonthly = p("monthly:2");
        assert!(
            !occurs_on_with_options(&anchor, Some(&bimonthly), date(2026, 2, 28), &options)
                .unwrap()
        );
    }

    #[test]
    fn test_month_end_policy_from_str() {
        assert_eq!("Clamp".parse::<MonthEndPolicy>().unwrap(), MonthEndPolicy::Clamp);
        assert_eq!("skip".parse::<MonthEndPolicy>().unwrap(), MonthEndPolicy::Skip);
        assert_eq!("reject".parse::<MonthEndPolicy>().unwrap(), MonthEndPolicy::Reject);
        let err = "wrap".parse::<MonthEndPolicy>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidMonthEndPolicy(_)), "got: {err:?}");
        assert_eq!(
            err.to_string(),
            "Invalid month-end policy: 'wrap' (expected clamp, skip or reject)"
        );
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2026, 2), 28);
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2026, 4), 30);
        assert_eq!(last_day_of_month(2026, 12), 31);
    }

    proptest! {
        #[test]
        fn proptest_no_pattern_single_date(offset in -400i64..400) {
            let anchor = monday_anchor();
            let target = anchor.start_date() + Duration::days(offset);
            prop_assert_eq!(occurs_on(&anchor, None, target), offset == 0);
        }

        #[test]
        fn proptest_daily_multiples(n in 1u32..30, offset in 0i64..400) {
            let anchor = monday_anchor();
            let target = anchor.start_date() + Duration::days(offset);
            let daily = Pattern::daily(n).unwrap();
            prop_assert_eq!(
                occurs_on(&anchor, Some(&daily), target),
                offset % i64::from(n) == 0
            );
        }

        #[test]
        fn proptest_weekly_multiples(n in 1u32..8, offset in 0i64..400) {
            let anchor = monday_anchor();
            let target = anchor.start_date() + Duration::days(offset);
            let weekly = Pattern::weekly(n).unwrap();
            prop_assert_eq!(
                occurs_on(&anchor, Some(&weekly), target),
                offset % (7 * i64::from(n)) == 0
            );
        }
    }
}
