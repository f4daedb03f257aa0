// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::AnswerPolicy;

/// Command-line arguments for `runwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runwatch",
    version,
    about = "Submit a DSL workflow to an execution service and follow its live log.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Project to run. May be omitted when exactly one is configured.
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// DSL file to submit instead of the project's default.
    #[arg(long, value_name = "PATH")]
    pub dsl: Option<String>,

    /// Screw holes JSON file sent as auxiliary data.
    #[arg(long, value_name = "PATH")]
    pub screw_holes: Option<String>,

    /// Override the project's execution service URL.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Answer every confirmation request with yes.
    #[arg(long, conflicts_with = "no")]
    pub yes: bool,

    /// Answer every confirmation request with no.
    #[arg(long)]
    pub no: bool,

    /// List configured projects and exit.
    #[arg(long)]
    pub list_projects: bool,

    /// Resolve and print the request, but don't contact the service.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Policy forced by `--yes` / `--no`, if any.
    pub fn answer_policy(&self) -> Option<AnswerPolicy> {
        match (self.yes, self.no) {
            (true, _) => Some(AnswerPolicy::Yes),
            (_, true) => Some(AnswerPolicy::No),
            _ => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
