//! Whether a class can be joined now, and the badge it shows.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::occurrence::{occurs_on_with_options, EvaluateOptions, ScheduleAnchor};
use crate::pattern::Pattern;
use crate::window::{window_status, WindowStatus};

/// Status shown for a class at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    /// Occurring today and inside today's window.
    Active,
    /// A one-off class whose end has passed.
    Ended,
    /// A recurring class with no occurrence today.
    NotToday,
    Scheduled,
}

/// A class is joinable when it occurs on `now`'s date and `now` falls inside
/// today's window.
///
/// Uses the default (clamp) month-end policy, which cannot fail.
pub fn is_joinable(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    now: NaiveDateTime,
) -> bool {
    match is_joinable_with_options(anchor, pattern, now, &EvaluateOptions::default()) {
        Ok(joinable) => joinable,
        Err(err) => unreachable!("clamp month-end policy cannot fail: {err}"),
    }
}

/// [`is_joinable`] with explicit options.
///
/// # Errors
///
/// Propagates [`crate::EngineError::AmbiguousMonthlyAnchor`] under the reject
/// month-end policy.
pub fn is_joinable_with_options(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    now: NaiveDateTime,
    options: &EvaluateOptions,
) -> Result<bool> {
    let occurs_today = occurs_on_with_options(anchor, pattern, now.date(), options)?;
    Ok(occurs_today
        && window_status(anchor.start_time(), anchor.end_time(), now) == WindowStatus::During)
}

/// The display status of a class at `now`.
///
/// * `Active` when joinable.
/// * Recurring: `NotToday` without an occurrence today, else `Scheduled`.
/// * One-off: `Ended` once `now` is past the anchor's end, else `Scheduled`.
///
/// Uses the default (clamp) month-end policy, which cannot fail.
pub fn display_status(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    now: NaiveDateTime,
) -> DisplayStatus {
    match display_status_with_options(anchor, pattern, now, &EvaluateOptions::default()) {
        Ok(status) => status,
        Err(err) => unreachable!("clamp month-end policy cannot fail: {err}"),
    }
}

/// [`display_status`] with explicit options.
///
/// # Errors
///
/// Propagates [`crate::EngineError::AmbiguousMonthlyAnchor`] under the reject
/// month-end policy.
pub fn display_status_with_options(
    anchor: &ScheduleAnchor,
    pattern: Option<&Pattern>,
    now: NaiveDateTime,
    options: &EvaluateOptions,
) -> Result<DisplayStatus> {
    let occurs_today = occurs_on_with_options(anchor, pattern, now.date(), options)?;
    let window = window_status(anchor.start_time(), anchor.end_time(), now);
    if occurs_today && window == WindowStatus::During {
        return Ok(DisplayStatus::Active);
    }

    let status = match pattern {
        Some(_) if !occurs_today => DisplayStatus::NotToday,
        Some(_) => DisplayStatus::Scheduled,
        None if now > anchor.end => DisplayStatus::Ended,
        None => DisplayStatus::Scheduled,
    };
    Ok(status)
}
