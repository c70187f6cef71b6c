//! Configuration parsing and validation.
//!
//! An optional TOML file supplies defaults; command-line flags override it:
//!
//! ```toml
//! [engine]
//! timezone = "Europe/Berlin"
//! month_end = "skip"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use occurrence_engine::{EvaluateOptions, MonthEndPolicy, ReferenceFrame};
use serde::Deserialize;

/// Top-level configuration stanza.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFragment {
    pub(crate) engine: Option<EngineFragment>,
}

/// Config fragment for the evaluation engine.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct EngineFragment {
    /// IANA zone name of the reference frame (default: UTC).
    pub(crate) timezone: Option<String>,
    /// Month-end policy for monthly patterns (default: clamp).
    pub(crate) month_end: Option<String>,
}

/// Values given on the command line, which win over the file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) timezone: Option<String>,
    pub(crate) month_end: Option<MonthEndPolicy>,
}

/// Validated settings for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) frame: ReferenceFrame,
    pub(crate) options: EvaluateOptions,
}

impl Settings {
    /// Read the config file (if any), merge overrides and validate.
    pub(crate) fn assemble(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let fragment = match path {
            Some(path) => read_fragment(path)?,
            None => ConfigFragment::default(),
        };
        Self::validate(fragment, overrides)
    }

    fn validate(fragment: ConfigFragment, overrides: Overrides) -> Result<Self> {
        let engine = fragment.engine.unwrap_or_default();

        let frame = match overrides.timezone.or(engine.timezone) {
            Some(name) => ReferenceFrame::from_name(&name)
                .context("failed to validate reference timezone")?,
            None => ReferenceFrame::default(),
        };

        let month_end = match (overrides.month_end, engine.month_end) {
            (Some(policy), _) => policy,
            (None, Some(text)) => text
                .parse::<MonthEndPolicy>()
                .context("failed to validate month-end policy")?,
            (None, None) => MonthEndPolicy::default(),
        };

        let settings = Self {
            frame,
            options: EvaluateOptions { month_end },
        };
        tracing::debug!(timezone = settings.frame.name(), %month_end, "settings assembled");
        Ok(settings)
    }
}

fn read_fragment(path: &Path) -> Result<ConfigFragment> {
    tracing::trace!("reading config file '{}'", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file '{}'", path.display()))?;
    toml::from_str(&content).context("failed to parse TOML")
}
