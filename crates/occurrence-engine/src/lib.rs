//! # occurrence-engine
//!
//! Deterministic scheduling arithmetic for live classes.
//!
//! Given a class's anchor (its stored start/end) and an optional repeat
//! pattern, the engine answers whether the class occurs on a date, whether
//! it can be joined right now, which badge it shows, when it last happened
//! and happens next, and what start/duration to hand a conferencing provider
//! when an instructor opens the room.
//!
//! Every function is pure. The caller captures "now" once per request and
//! passes it in; nothing here reads the clock or does I/O.
//!
//! ## Modules
//!
//! - [`pattern`] — repeat pattern string → [`Pattern`]
//! - [`occurrence`] — does the class occur on a date
//! - [`window`] — before / during / after today's window
//! - [`joinability`] — joinable now, and the display status
//! - [`search`] — nearest previous and next occurrence
//! - [`adjust`] — normalized meeting start and time-of-day duration
//! - [`frame`] — reference frame and ISO-8601 parsing at the boundary
//! - [`schedule`] — collaborator records and per-request queries
//! - [`error`] — Error types

pub mod adjust;
pub mod error;
pub mod frame;
pub mod joinability;
pub mod occurrence;
pub mod pattern;
pub mod schedule;
pub mod search;
pub mod window;

pub use adjust::{adjust_meeting_time, MeetingSlot, START_BUFFER_SECS};
pub use error::EngineError;
pub use frame::{parse_date, parse_instant, ReferenceFrame};
pub use joinability::{
    display_status, display_status_with_options, is_joinable, is_joinable_with_options,
    DisplayStatus,
};
pub use occurrence::{
    occurs_on, occurs_on_with_options, EvaluateOptions, MonthEndPolicy, ScheduleAnchor,
};
pub use pattern::{Pattern, RepeatKind, WeekdaySet};
pub use schedule::{
    Evaluation, MeetingPlan, MeetingRequest, OccurrenceQuery, Schedule, ScheduleRecord,
};
pub use search::{
    find_adjacent, find_adjacent_with_options, AdjacentOccurrences, SEARCH_DAYS_AFTER,
    SEARCH_DAYS_BEFORE,
};
pub use window::{todays_window, window_status, WindowStatus};
