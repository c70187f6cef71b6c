//! Error types for occurrence-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid repeat pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid month-end policy: {0}")]
    InvalidMonthEndPolicy(String),

    #[error(
        "Ambiguous monthly anchor: day {anchor_day} does not exist in {year:04}-{month:02}"
    )]
    AmbiguousMonthlyAnchor {
        anchor_day: u32,
        year: i32,
        month: u32,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
