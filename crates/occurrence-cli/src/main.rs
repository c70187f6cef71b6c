//! Command-line front end for evaluating class schedules.
//!
//! # Usage
//!
//! ```bash
//! occurs status --start 2026-03-02T09:00:00Z --end 2026-03-02T10:00:00Z --repeat weekly:1
//! occurs adjust --start 2026-03-15T14:00:00Z --end 2026-03-15T15:30:00Z --class-name "Algebra II"
//! occurs --timezone Europe/Berlin evaluate --record @schedule.json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level, overriding `-v` flags (e.g. `debug`)

mod cli;
mod config;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let cli_opts = cli::CliOptions::parse();

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| cli_opts.loglevel());
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    match cli_opts.run() {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log_error_chain(&e.into());
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log_error_chain(&e);
            ExitCode::FAILURE
        }
    }
}

/// Pretty-print a chain of errors, as a series of error-priority log messages.
fn log_error_chain(err_chain: &anyhow::Error) {
    let mut chain_iter = err_chain.chain();
    let top_err = match chain_iter.next() {
        Some(e) => e.to_string(),
        None => "(unspecified failure)".to_string(),
    };
    tracing::error!("error: {}", top_err);
    for err in chain_iter {
        tracing::error!(" -> {}", err);
    }
}
