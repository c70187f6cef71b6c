//! Nearest occurrences around "now".
//!
//! The search is bounded to a fixed horizon around the anchor's date, not
//! around "now", so it does a bounded amount of work. A class whose next
//! occurrence lies past the horizon reports `next: None`; callers needing a
//! longer view re-invoke with a later anchor.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::Result;
use crate::occurrence::{monthly_day, occurs_on_with_options, EvaluateOptions, ScheduleAnchor};
use crate::pattern::Pattern;

/// Days before the anchor date covered by the search.
pub const SEARCH_DAYS_BEFORE: i64 = 30;

/// Days after the anchor date covered by the search.
pub const SEARCH_DAYS_AFTER: i64 = 365;

/// The occurrences closest to today, excluding today itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AdjacentOccurrences {
    pub next: Option<NaiveDate>,
    pub previous: Option<NaiveDate>,
}

/// Find the nearest occurrence after and before `now`'s date, using default
/// options. The default clamp month-end policy always resolves a day, so this
/// cannot fail.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use occurrence_engine::occurrence::ScheduleAnchor;
/// use occurrence_engine::pattern::Pattern;
/// use occurrence_engine::search::find_adjacent;
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let anchor = ScheduleAnchor::new(
///     day.and_hms_opt(9, 0, 0).unwrap(),
///     day.and_hms_opt(10, 0, 0).unwrap(),
/// );
/// let weekly = Pattern::parse("weekly:1").unwrap();
/// let now = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap().and_hms_opt(12, 0, 0).unwrap();
///
/// let adjacent = find_adjacent(&anchor, Some(&weekly), now);
/// assert_eq!(adjacent.previous, NaiveDate::from_ymd_opt(2026, 3, 9));
/// assert_eq!(adjacent.next, NaiveDate::from_ymd_opt(2026, 3, 16));
/// ```
pub fn find_adjacent(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    now: NaiveDateTime,
) -> AdjacentOccurrences {
    match find_adjacent_with_options(anchor, pattern, now, &EvaluateOptions::default()) {
        Ok(adjacent) => adjacent,
        Err(err) => unreachable!("clamp month-end policy cannot fail: {err}"),
    }
}

/// [`find_adjacent`] with explicit options.
///
/// Every reported date also satisfies
/// [`occurs_on_with_options`](crate::occurrence::occurs_on_with_options).
///
/// # Errors
///
/// Under the reject month-end policy, a monthly pattern hitting a short month
/// inside the horizon yields [`crate::EngineError::AmbiguousMonthlyAnchor`].
pub fn find_adjacent_with_options(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    now: NaiveDateTime,
    options: &EvaluateOptions,
) -> Result<AdjacentOccurrences> {
    let today = now.date();
    let mut adjacent = AdjacentOccurrences::default();

    for date in candidates(anchor, pattern, options)? {
        if date == today || !occurs_on_with_options(anchor, pattern, date, options)? {
            continue;
        }
        if date < today {
            adjacent.previous = Some(date);
        } else if adjacent.next.is_none() {
            adjacent.next = Some(date);
        }
    }

    tracing::debug!(
        %today,
        next = ?adjacent.next,
        previous = ?adjacent.previous,
        "searched adjacent occurrences"
    );
    Ok(adjacent)
}

/// Candidate dates inside the horizon, ascending, per the pattern's
/// generation rule.
fn candidates(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    options: &EvaluateOptions,
) -> Result<Vec<NaiveDate>> {
    let origin = anchor.start_date();
    let first = origin - Duration::days(SEARCH_DAYS_BEFORE);
    let last = origin + Duration::days(SEARCH_DAYS_AFTER);

    let dates = match pattern {
        None => vec![origin],
        Some(Pattern::Daily(n)) => stepped(origin, i64::from(n.get())),
        Some(Pattern::Weekly(n)) => stepped(origin, 7 * i64::from(n.get())),
        Some(Pattern::Monthly(n)) => {
            let step = i64::from(n.get());
            let mut dates = Vec::new();
            let mut offset = 0;
            loop {
                let (year, month) = shift_month(origin.year(), origin.month(), offset);
                let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
                    break;
                };
                if month_start > last {
                    break;
                }
                if let Some(day) = monthly_day(origin.day(), year, month, options.month_end)? {
                    dates.extend(NaiveDate::from_ymd_opt(year, month, day));
                }
                offset += step;
            }
            dates
        }
        Some(Pattern::Weekdays(_)) | Some(Pattern::Custom(..)) => {
            first.iter_days().take_while(|d| *d <= last).collect()
        }
    };

    Ok(dates
        .into_iter()
        .filter(|d| *d >= first && *d <= last)
        .collect())
}

/// Dates `origin + k * step` within the horizon, for integer `k`.
fn stepped(origin: NaiveDate, step: i64) -> Vec<NaiveDate> {
    let first_offset = -(SEARCH_DAYS_BEFORE / step) * step;
    (first_offset..=SEARCH_DAYS_AFTER)
        .step_by(step as usize)
        .map(|offset| origin + Duration::days(offset))
        .collect()
}

/// The (year, month) `offset` months away from `year`-`month`.
fn shift_month(year: i32, month: u32, offset: i64) -> (i32, u32) {
    let total = i64::from(year) * 12 + i64::from(month) - 1 + offset;
    (total.div_euclid(12) as i32, total.rem_euclid(12) as u32 + 1)
}
