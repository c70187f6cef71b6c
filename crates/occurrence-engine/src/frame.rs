//! The reference frame every comparison happens in, and parsing of instants
//! at the boundary.
//!
//! The engine itself only sees naive wall-clock values. Mixing frames (one
//! value read as local time, another as UTC) silently shifts windows by the
//! offset, so all inputs are converted into one [`ReferenceFrame`] before any
//! evaluation. UTC is the default. A named IANA zone is the only other option
//! and must be passed explicitly.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Naive formats accepted in addition to RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The frame in which naive wall-clock values are read and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceFrame {
    /// Coordinated Universal Time; no gaps or repeated hours.
    #[default]
    Utc,
    /// A named IANA zone, subject to its DST transitions.
    Zone(Tz),
}

impl ReferenceFrame {
    /// Look up a frame by IANA name. `"UTC"` (any case) and `"Z"` give
    /// [`ReferenceFrame::Utc`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTimezone`] for an unknown zone name.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("utc") || name == "Z" {
            return Ok(ReferenceFrame::Utc);
        }
        name.parse::<Tz>()
            .map(ReferenceFrame::Zone)
            .map_err(|_| EngineError::InvalidTimezone(format!("'{name}'")))
    }

    /// The frame's IANA name (`"UTC"` for [`ReferenceFrame::Utc`]).
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceFrame::Utc => "UTC",
            ReferenceFrame::Zone(tz) => tz.name(),
        }
    }

    /// The wall-clock reading of `instant` in this frame.
    pub fn localize(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            ReferenceFrame::Utc => instant.naive_utc(),
            ReferenceFrame::Zone(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Map a wall-clock reading onto one that exists in this frame.
    ///
    /// A reading inside a spring-forward gap is shifted forward by the gap's
    /// length, so 02:30 on a day that jumps from 02:00 to 03:00 becomes 03:30.
    /// Readings that exist, including the repeated hour of a fall-back day,
    /// are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDatetime`] if the shifted reading still
    /// does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use occurrence_engine::frame::ReferenceFrame;
    ///
    /// let ny = ReferenceFrame::from_name("America/New_York").unwrap();
    /// let gap = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap().and_hms_opt(2, 30, 0).unwrap();
    /// assert_eq!(ny.resolve_local(gap).unwrap().to_string(), "2026-03-08 03:30:00");
    /// ```
    pub fn resolve_local(&self, local: NaiveDateTime) -> Result<NaiveDateTime> {
        let ReferenceFrame::Zone(tz) = self else {
            return Ok(local);
        };
        if !matches!(tz.from_local_datetime(&local), LocalResult::None) {
            return Ok(local);
        }

        // The offset in force a day earlier is the one the gap jumped from.
        let before = tz
            .offset_from_utc_datetime(&(local - Duration::days(1)))
            .fix()
            .local_minus_utc();
        let instant = local - Duration::seconds(i64::from(before));
        let shifted = tz.from_utc_datetime(&instant).naive_local();

        if matches!(tz.from_local_datetime(&shifted), LocalResult::None) {
            return Err(EngineError::InvalidDatetime(format!(
                "'{local}' does not exist in {}",
                tz.name()
            )));
        }
        tracing::debug!(
            %local,
            %shifted,
            zone = tz.name(),
            "shifted wall-clock time out of a DST gap"
        );
        Ok(shifted)
    }

    /// Parse an ISO-8601 instant into this frame.
    ///
    /// Strings with an offset (RFC 3339, e.g. `2026-03-16T09:00:00.000Z`) are
    /// converted. Strings without one are taken to be wall-clock readings in
    /// this frame already.
    ///
    /// # Examples
    ///
    /// ```
    /// use occurrence_engine::frame::ReferenceFrame;
    ///
    /// let berlin = ReferenceFrame::from_name("Europe/Berlin").unwrap();
    /// let t = berlin.parse_instant("2026-01-15T08:00:00Z").unwrap();
    /// assert_eq!(t.to_string(), "2026-01-15 09:00:00");
    /// ```
    pub fn parse_instant(&self, s: &str) -> Result<NaiveDateTime> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(self.localize(dt.with_timezone(&Utc)));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .ok_or_else(|| EngineError::InvalidDatetime(format!("'{s}'")))
    }
}

// ── Free functions ───────────────────────────────────────────────────────────

/// Parse an instant in the default (UTC) frame.
pub fn parse_instant(s: &str) -> Result<NaiveDateTime> {
    ReferenceFrame::Utc.parse_instant(s)
}

/// Parse a calendar date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDatetime(format!("'{s}': {e}")))
}
