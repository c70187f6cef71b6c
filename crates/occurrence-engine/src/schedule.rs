//! Schedule records from collaborators, and per-request queries over them.
//!
//! A [`ScheduleRecord`] is what the persistence layer hands over: two ISO-8601
//! strings and an optional pattern string. Resolving it yields a typed
//! [`Schedule`]. Every request then builds one [`OccurrenceQuery`] holding a
//! single captured "now", and all answers for that request come from it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::adjust::adjust_meeting_time;
use crate::error::Result;
use crate::frame::ReferenceFrame;
use crate::joinability::{display_status_with_options, DisplayStatus};
use crate::occurrence::{occurs_on_with_options, EvaluateOptions, ScheduleAnchor};
use crate::pattern::Pattern;
use crate::search::{find_adjacent_with_options, AdjacentOccurrences};
use crate::window::{window_status, WindowStatus};

// ── Records ──────────────────────────────────────────────────────────────────

/// A class schedule as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub start_time: String,
    pub end_time: String,
    /// Repeat pattern string; missing or blank means a one-off class.
    #[serde(default)]
    pub repeat_every_n_day: Option<String>,
}

impl ScheduleRecord {
    /// Parse the record's instants into `frame` and its pattern.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::InvalidDatetime`] for an unparseable
    /// instant and [`crate::EngineError::InvalidPattern`] for a non-blank
    /// pattern that does not parse. A bad pattern is never read as "no
    /// recurrence".
    pub fn resolve(&self, frame: &ReferenceFrame) -> Result<Schedule> {
        let start = frame.parse_instant(&self.start_time)?;
        let end = frame.parse_instant(&self.end_time)?;
        let pattern = Pattern::parse_optional(self.repeat_every_n_day.as_deref())?;
        Ok(Schedule::new(ScheduleAnchor::new(start, end), pattern))
    }
}

/// A resolved class schedule: its anchor and optional repeat pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    anchor: ScheduleAnchor,
    pattern: Option<Pattern>,
}

impl Schedule {
    /// A schedule from an anchor and an optional pattern (`None` = one-off).
    pub fn new(anchor: ScheduleAnchor, pattern: Option<Pattern>) -> Self {
        Self { anchor, pattern }
    }

    /// The stored single occurrence.
    pub fn anchor(&self) -> &ScheduleAnchor {
        &self.anchor
    }

    /// The repeat pattern, if the class recurs.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// A query about `now`'s own date.
    pub fn query(&self, now: NaiveDateTime) -> OccurrenceQuery<'_> {
        self.query_on(now.date(), now)
    }

    /// A query about `target_date`, evaluated at `now`.
    pub fn query_on(&self, target_date: NaiveDate, now: NaiveDateTime) -> OccurrenceQuery<'_> {
        OccurrenceQuery {
            anchor: self.anchor,
            pattern: self.pattern.as_ref(),
            target_date,
            now,
            options: EvaluateOptions::default(),
        }
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

/// One request's view of a schedule. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceQuery<'a> {
    pub anchor: ScheduleAnchor,
    pub pattern: Option<&'a Pattern>,
    pub target_date: NaiveDate,
    pub now: NaiveDateTime,
    pub options: EvaluateOptions,
}

/// Everything the UI shows for a class at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub date: NaiveDate,
    pub occurs: bool,
    pub occurs_today: bool,
    pub window: WindowStatus,
    pub joinable: bool,
    pub status: DisplayStatus,
    pub next: Option<NaiveDate>,
    pub previous: Option<NaiveDate>,
}

impl<'a> OccurrenceQuery<'a> {
    /// The same query under different evaluation options.
    pub fn with_options(self, options: EvaluateOptions) -> Self {
        Self { options, ..self }
    }

    /// Whether the class occurs on the target date.
    pub fn occurs(&self) -> Result<bool> {
        occurs_on_with_options(&self.anchor, self.pattern, self.target_date, &self.options)
    }

    /// Whether the class occurs on `now`'s date.
    pub fn occurs_today(&self) -> Result<bool> {
        occurs_on_with_options(&self.anchor, self.pattern, self.now.date(), &self.options)
    }

    /// Where `now` sits in today's window.
    pub fn window(&self) -> WindowStatus {
        window_status(self.anchor.start_time(), self.anchor.end_time(), self.now)
    }

    /// Whether the class occurs today and `now` is inside the window.
    pub fn is_joinable(&self) -> Result<bool> {
        Ok(self.occurs_today()? && self.window() == WindowStatus::During)
    }

    /// The badge shown at `now`. See [`display_status_with_options`].
    pub fn display_status(&self) -> Result<DisplayStatus> {
        display_status_with_options(&self.anchor, self.pattern, self.now, &self.options)
    }

    /// Nearest occurrences before and after `now`'s date.
    pub fn adjacent(&self) -> Result<AdjacentOccurrences> {
        find_adjacent_with_options(&self.anchor, self.pattern, self.now, &self.options)
    }

    /// All of the above in one value.
    pub fn evaluate(&self) -> Result<Evaluation> {
        let adjacent = self.adjacent()?;
        Ok(Evaluation {
            date: self.target_date,
            occurs: self.occurs()?,
            occurs_today: self.occurs_today()?,
            window: self.window(),
            joinable: self.is_joinable()?,
            status: self.display_status()?,
            next: adjacent.next,
            previous: adjacent.previous,
        })
    }
}

// ── Meeting plans ────────────────────────────────────────────────────────────

/// A request to open a meeting room for a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    pub start_date: String,
    pub end_date: String,
    pub class_name: String,
}

/// Start and duration to send to the conferencing provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingPlan {
    pub topic: String,
    pub starts_at: NaiveDateTime,
    /// Frame `starts_at` is expressed in.
    pub timezone: String,
    pub duration_minutes: i64,
    pub duration_hours: f64,
    pub duration_ms: i64,
    pub buffered: bool,
}

impl MeetingRequest {
    /// Normalize the requested slot against `now`.
    ///
    /// A start rebased or buffered into a spring-forward gap of `frame` is
    /// moved out of it with [`ReferenceFrame::resolve_local`], so `starts_at`
    /// always names a wall-clock time that exists in `timezone`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::InvalidDatetime`] if either requested
    /// instant does not parse.
    pub fn plan(&self, now: NaiveDateTime, frame: &ReferenceFrame) -> Result<MeetingPlan> {
        let start = frame.parse_instant(&self.start_date)?;
        let end = frame.parse_instant(&self.end_date)?;
        let slot = adjust_meeting_time(start, end, now);
        let starts_at = frame.resolve_local(slot.starts_at)?;

        tracing::debug!(
            class = %self.class_name,
            %starts_at,
            duration_minutes = slot.duration_minutes,
            "planned meeting"
        );

        Ok(MeetingPlan {
            topic: self.class_name.clone(),
            starts_at,
            timezone: frame.name().to_string(),
            duration_minutes: slot.duration_minutes,
            duration_hours: slot.duration_hours,
            duration_ms: slot.duration_ms,
            buffered: slot.buffered,
        })
    }
}
