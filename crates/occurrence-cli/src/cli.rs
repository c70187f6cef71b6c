//! Command-Line Interface (CLI) logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::level_filters::LevelFilter;

use occurrence_engine::{
    parse_date, MeetingRequest, MonthEndPolicy, Pattern, Schedule, ScheduleRecord,
};

use crate::config::{Overrides, Settings};

/// Evaluate class schedules: occurrences, joinability and meeting slots.
#[derive(Debug, Parser)]
#[command(name = "occurs", version, about)]
pub(crate) struct CliOptions {
    /// Verbosity level (higher is more verbose).
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    verbosity: u8,

    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// IANA timezone all instants are compared in (default: UTC).
    #[arg(long, global = true, value_name = "ZONE")]
    timezone: Option<String>,

    /// How monthly patterns treat months without the anchor's day.
    #[arg(long, global = true, value_name = "clamp|skip|reject")]
    month_end: Option<MonthEndPolicy>,

    /// The current instant, ISO-8601 (default: the system clock).
    #[arg(long, global = true, value_name = "INSTANT")]
    now: Option<String>,

    #[command(subcommand)]
    pub(crate) cmd: CliCommand,
}

/// CLI sub-commands.
#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Parse a repeat pattern and print its canonical form.
    Pattern {
        /// Pattern string, e.g. "weekly:2" or "custom:1:1,3,5".
        text: String,
    },
    /// Whether the class occurs on a date.
    On {
        #[command(flatten)]
        class: ClassArgs,
        /// Calendar date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },
    /// Today's window, joinability and display status.
    Status {
        #[command(flatten)]
        class: ClassArgs,
    },
    /// Nearest previous and next occurrence dates.
    Adjacent {
        #[command(flatten)]
        class: ClassArgs,
    },
    /// Start time and duration for opening a meeting room.
    Adjust {
        /// Requested start instant.
        #[arg(long)]
        start: String,
        /// Requested end instant.
        #[arg(long)]
        end: String,
        /// Meeting topic.
        #[arg(long, default_value = "Class")]
        class_name: String,
    },
    /// Full evaluation of a stored schedule record (JSON, or @file).
    Evaluate {
        #[arg(long, value_name = "JSON|@PATH")]
        record: String,
        /// Target date (default: today).
        #[arg(long)]
        date: Option<String>,
    },
}

/// A class given on the command line.
#[derive(Debug, Args)]
pub(crate) struct ClassArgs {
    /// Anchor start instant.
    #[arg(long)]
    start: String,
    /// Anchor end instant.
    #[arg(long)]
    end: String,
    /// Repeat pattern; omit for a one-off class.
    #[arg(long)]
    repeat: Option<String>,
}

impl ClassArgs {
    fn record(&self) -> ScheduleRecord {
        ScheduleRecord {
            start_time: self.start.clone(),
            end_time: self.end.clone(),
            repeat_every_n_day: self.repeat.clone(),
        }
    }
}

impl CliOptions {
    /// Returns the log-level set via command-line flags.
    pub(crate) fn loglevel(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Dispatch CLI subcommand, returning the JSON to print.
    pub(crate) fn run(self) -> Result<Value> {
        let settings = Settings::assemble(
            self.config.as_deref(),
            Overrides {
                timezone: self.timezone,
                month_end: self.month_end,
            },
        )?;

        // Captured once; every answer below uses this same instant.
        let now = match self.now.as_deref() {
            Some(text) => settings
                .frame
                .parse_instant(text)
                .context("failed to parse --now")?,
            None => settings.frame.localize(Utc::now()),
        };
        tracing::info!(%now, timezone = settings.frame.name(), "evaluating");

        match self.cmd {
            CliCommand::Pattern { text } => pattern(&text),
            CliCommand::On { class, date } => {
                let schedule = resolve(&class.record(), &settings)?;
                let date = parse_date(&date).context("failed to parse --date")?;
                let occurs = schedule
                    .query_on(date, now)
                    .with_options(settings.options)
                    .occurs()?;
                Ok(json!({ "date": date, "occurs": occurs }))
            }
            CliCommand::Status { class } => {
                let schedule = resolve(&class.record(), &settings)?;
                let query = schedule.query(now).with_options(settings.options);
                Ok(json!({
                    "occurs_today": query.occurs_today()?,
                    "window": query.window(),
                    "joinable": query.is_joinable()?,
                    "status": query.display_status()?,
                }))
            }
            CliCommand::Adjacent { class } => {
                let schedule = resolve(&class.record(), &settings)?;
                let adjacent = schedule
                    .query(now)
                    .with_options(settings.options)
                    .adjacent()?;
                Ok(serde_json::to_value(adjacent)?)
            }
            CliCommand::Adjust {
                start,
                end,
                class_name,
            } => {
                let request = MeetingRequest {
                    start_date: start,
                    end_date: end,
                    class_name,
                };
                let plan = request.plan(now, &settings.frame)?;
                Ok(serde_json::to_value(plan)?)
            }
            CliCommand::Evaluate { record, date } => {
                let record = read_record(&record)?;
                let schedule = resolve(&record, &settings)?;
                let date = match date {
                    Some(d) => parse_date(&d).context("failed to parse --date")?,
                    None => now.date(),
                };
                let evaluation = schedule
                    .query_on(date, now)
                    .with_options(settings.options)
                    .evaluate()?;
                Ok(serde_json::to_value(evaluation)?)
            }
        }
    }
}

fn pattern(text: &str) -> Result<Value> {
    let pattern = Pattern::parse(text)?;
    let days: Option<Vec<u8>> = pattern.days().map(|d| d.indices().collect());
    Ok(json!({
        "kind": pattern.kind(),
        "interval": pattern.interval(),
        "days": days,
        "canonical": pattern.to_string(),
    }))
}

fn resolve(record: &ScheduleRecord, settings: &Settings) -> Result<Schedule> {
    record
        .resolve(&settings.frame)
        .context("failed to resolve class schedule")
}

/// Parse a record given inline, or read from a file with a leading `@`.
fn read_record(arg: &str) -> Result<ScheduleRecord> {
    let content = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read file '{path}'"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&content).context("failed to parse schedule record")
}
