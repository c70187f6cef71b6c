//! Repeat patterns and their compact string encoding.
//!
//! A class repeats according to a [`Pattern`], stored by collaborators as a
//! short string such as `"weekly:2"` or `"custom:1:1,3,5"`:
//!
//! ```text
//! <kind>:<interval>[:<comma-separated weekday indices>]
//! ```
//!
//! `kind` is one of `daily`, `weekly`, `monthly`, `weekdays`, `custom`.
//! `interval` is a positive integer. Weekday indices run from `0` (Sunday) to
//! `6` (Saturday) and are only allowed, and then required, for `custom`.
//!
//! Parsing never guesses: anything that does not match the grammar is an
//! [`EngineError::InvalidPattern`], and it is up to the caller to decide
//! whether that means "no recurrence".

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// ── RepeatKind ───────────────────────────────────────────────────────────────

/// The kind of a repeat rule, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    Daily,
    Weekly,
    Monthly,
    Weekdays,
    Custom,
}

impl RepeatKind {
    /// The keyword used in the string encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatKind::Daily => "daily",
            RepeatKind::Weekly => "weekly",
            RepeatKind::Monthly => "monthly",
            RepeatKind::Weekdays => "weekdays",
            RepeatKind::Custom => "custom",
        }
    }

    fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Some(RepeatKind::Daily),
            "weekly" => Some(RepeatKind::Weekly),
            "monthly" => Some(RepeatKind::Monthly),
            "weekdays" => Some(RepeatKind::Weekdays),
            "custom" => Some(RepeatKind::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for RepeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── WeekdaySet ───────────────────────────────────────────────────────────────

/// A non-empty set of weekdays, indexed `0` = Sunday .. `6` = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    /// Build a set from Sunday-based indices.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if the input is empty or holds an
    /// index outside `0..=6`.
    pub fn from_indices<I>(indices: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let set: BTreeSet<u8> = indices.into_iter().collect();
        if set.is_empty() {
            return Err(EngineError::InvalidPattern(
                "custom pattern needs at least one weekday".to_string(),
            ));
        }
        if let Some(bad) = set.iter().find(|d| **d > 6) {
            return Err(EngineError::InvalidPattern(format!(
                "weekday index {bad} is outside 0..=6"
            )));
        }
        Ok(Self(set))
    }

    /// Whether `weekday` is in the set.
    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0.contains(&weekday_index(weekday))
    }

    /// Sunday-based indices, ascending.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

/// Sunday-based index of a weekday (`0` = Sunday, `6` = Saturday).
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

// ── Pattern ──────────────────────────────────────────────────────────────────

/// A parsed repeat rule.
///
/// Every variant carries its interval. Only `Custom` carries a day set, so a
/// day set on any other kind cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Pattern {
    Daily(NonZeroU32),
    Weekly(NonZeroU32),
    Monthly(NonZeroU32),
    /// Monday to Friday. The interval is accepted for compatibility but unused.
    Weekdays(NonZeroU32),
    Custom(NonZeroU32, WeekdaySet),
}

impl Pattern {
    /// Parse the compact string encoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use occurrence_engine::pattern::{Pattern, RepeatKind};
    ///
    /// let p = Pattern::parse("custom:1:5,1,3").unwrap();
    /// assert_eq!(p.kind(), RepeatKind::Custom);
    /// assert_eq!(p.to_string(), "custom:1:1,3,5");
    ///
    /// assert!(Pattern::parse("fortnightly:1").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let invalid = |why: &str| EngineError::InvalidPattern(format!("'{trimmed}': {why}"));

        let mut parts = trimmed.split(':');
        let kind = parts
            .next()
            .and_then(RepeatKind::from_keyword)
            .ok_or_else(|| invalid("unknown kind"))?;
        let interval = parts.next().ok_or_else(|| invalid("missing interval"))?;
        let interval =
            parse_interval(interval).ok_or_else(|| invalid("interval must be a positive integer"))?;
        let days = parts.next();
        if parts.next().is_some() {
            return Err(invalid("too many fields"));
        }

        match (kind, days) {
            (RepeatKind::Custom, Some(list)) => {
                let indices = list
                    .split(',')
                    .map(|d| {
                        let d = d.trim();
                        if d.is_empty() || !d.bytes().all(|b| b.is_ascii_digit()) {
                            return Err(invalid("weekday list must be integers in 0..=6"));
                        }
                        d.parse::<u8>()
                            .map_err(|_| invalid("weekday list must be integers in 0..=6"))
                    })
                    .collect::<Result<Vec<u8>>>()?;
                Ok(Pattern::Custom(interval, WeekdaySet::from_indices(indices)?))
            }
            (RepeatKind::Custom, None) => Err(invalid("custom pattern needs a weekday list")),
            (_, Some(_)) => Err(invalid("only custom patterns take a weekday list")),
            (RepeatKind::Daily, None) => Ok(Pattern::Daily(interval)),
            (RepeatKind::Weekly, None) => Ok(Pattern::Weekly(interval)),
            (RepeatKind::Monthly, None) => Ok(Pattern::Monthly(interval)),
            (RepeatKind::Weekdays, None) => Ok(Pattern::Weekdays(interval)),
        }
    }

    /// Parse an optional stored pattern, where a missing or blank value means
    /// "no recurrence". A non-blank malformed value is still an error.
    pub fn parse_optional(text: Option<&str>) -> Result<Option<Self>> {
        match text.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }

    /// Every `interval` days from the anchor date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] for an interval of `0`.
    pub fn daily(interval: u32) -> Result<Self> {
        Ok(Pattern::Daily(checked_interval(interval)?))
    }

    /// On the anchor's weekday, every `interval` weeks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] for an interval of `0`.
    pub fn weekly(interval: u32) -> Result<Self> {
        Ok(Pattern::Weekly(checked_interval(interval)?))
    }

    /// On the anchor's day of month, every `interval` months.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] for an interval of `0`.
    pub fn monthly(interval: u32) -> Result<Self> {
        Ok(Pattern::Monthly(checked_interval(interval)?))
    }

    /// Monday to Friday, with interval `1`.
    pub fn weekdays() -> Self {
        Pattern::Weekdays(NonZeroU32::MIN)
    }

    /// On each listed weekday (`0` = Sunday .. `6` = Saturday).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] for an interval of `0`, an
    /// empty day list, or a day outside `0..=6`.
    pub fn custom<I>(interval: u32, days: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        Ok(Pattern::Custom(
            checked_interval(interval)?,
            WeekdaySet::from_indices(days)?,
        ))
    }

    /// The pattern's kind, without its parameters.
    pub fn kind(&self) -> RepeatKind {
        match self {
            Pattern::Daily(_) => RepeatKind::Daily,
            Pattern::Weekly(_) => RepeatKind::Weekly,
            Pattern::Monthly(_) => RepeatKind::Monthly,
            Pattern::Weekdays(_) => RepeatKind::Weekdays,
            Pattern::Custom(..) => RepeatKind::Custom,
        }
    }

    /// The interval, always at least `1`.
    pub fn interval(&self) -> u32 {
        match self {
            Pattern::Daily(n)
            | Pattern::Weekly(n)
            | Pattern::Monthly(n)
            | Pattern::Weekdays(n)
            | Pattern::Custom(n, _) => n.get(),
        }
    }

    /// The day set, present only for `Custom`.
    pub fn days(&self) -> Option<&WeekdaySet> {
        match self {
            Pattern::Custom(_, days) => Some(days),
            _ => None,
        }
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────────────

fn parse_interval(s: &str) -> Option<NonZeroU32> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().and_then(NonZeroU32::new)
}

fn checked_interval(interval: u32) -> Result<NonZeroU32> {
    NonZeroU32::new(interval)
        .ok_or_else(|| EngineError::InvalidPattern("interval must be at least 1".to_string()))
}

// ── Conversions ──────────────────────────────────────────────────────────────

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.interval())?;
        if let Some(days) = self.days() {
            let list: Vec<String> = days.indices().map(|d| d.to_string()).collect();
            write!(f, ":{}", list.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_kinds() {
        assert_eq!(Pattern::parse("daily:1").unwrap(), Pattern::daily(1).unwrap());
        assert_eq!(Pattern::parse("weekly:2").unwrap(), Pattern::weekly(2).unwrap());
        assert_eq!(Pattern::parse("monthly:3").unwrap(), Pattern::monthly(3).unwrap());
        assert_eq!(Pattern::parse("weekdays:1").unwrap(), Pattern::weekdays());
    }

    #[test]
    fn test_parse_custom_sorts_and_dedups_days() {
        let p = Pattern::parse("custom:1:5,3,1,3").unwrap();
        assert_eq!(p.kind(), RepeatKind::Custom);
        let days: Vec<u8> = p.days().unwrap().indices().collect();
        assert_eq!(days, vec![1, 3, 5]);
        assert_eq!(p.to_string(), "custom:1:1,3,5");
    }

    #[test]
    fn test_parse_is_lenient_on_case_and_whitespace() {
        let p = Pattern::parse("  Weekly:2 ").unwrap();
        assert_eq!(p.to_string(), "weekly:2");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "daily",
            "daily:",
            "daily:0",
            "daily:-1",
            "daily:+1",
            "daily:1.5",
            "daily:x",
            "hourly:1",
            "daily:1:2",
            "weekly:1:1,2",
            "custom:1",
            "custom:1:",
            "custom:1:7",
            "custom:1:1,,2",
            "custom:1:mon",
            "custom:1:1:2",
        ] {
            let err = Pattern::parse(bad).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidPattern(_)),
                "expected InvalidPattern for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_optional_blank_means_none() {
        assert_eq!(Pattern::parse_optional(None).unwrap(), None);
        assert_eq!(Pattern::parse_optional(Some("   ")).unwrap(), None);
        assert!(Pattern::parse_optional(Some("daily:1")).unwrap().is_some());
        assert!(Pattern::parse_optional(Some("nonsense")).is_err());
    }

    #[test]
    fn test_constructors_validate_invariants() {
        assert!(Pattern::daily(0).is_err());
        assert!(Pattern::custom(1, Vec::<u8>::new()).is_err());
        assert!(Pattern::custom(1, [0, 9]).is_err());
        assert!(Pattern::custom(2, [0, 6]).is_ok());
    }

    #[test]
    fn test_days_only_on_custom() {
        assert!(Pattern::weekly(1).unwrap().days().is_none());
        let p = Pattern::custom(1, [0]).unwrap();
        assert!(p.days().unwrap().contains(Weekday::Sun));
        assert!(!p.days().unwrap().contains(Weekday::Mon));
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let p = Pattern::custom(2, [3, 1]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"custom:2:1,3\"");
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Pattern>("\"daily:0\"").is_err());
    }

    fn arb_pattern() -> impl Strategy<Value = Pattern> {
        let interval = 1u32..=400;
        prop_oneof![
            interval.clone().prop_map(|n| Pattern::daily(n).unwrap()),
            interval.clone().prop_map(|n| Pattern::weekly(n).unwrap()),
            interval.clone().prop_map(|n| Pattern::monthly(n).unwrap()),
            interval
                .clone()
                .prop_map(|n| Pattern::Weekdays(NonZeroU32::new(n).unwrap())),
            (interval, prop::collection::btree_set(0u8..=6, 1..=7))
                .prop_map(|(n, days)| Pattern::custom(n, days).unwrap()),
        ]
    }

    proptest! {
        #[test]
        fn proptest_canonical_round_trip(p in arb_pattern()) {
            let text = p.to_string();
            let parsed = Pattern::parse(&text).unwrap();
            prop_assert_eq!(&parsed, &p);
            prop_assert_eq!(parsed.to_string(), text);
        }

        #[test]
        fn proptest_parse_never_panics(text in any::<String>()) {
            let _ = Pattern::parse(&text);
        }
    }
}
