//! Command line definitions for `score-report`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use score_cli::input::parse_answer_arg;

#[derive(Parser)]
#[command(
    name = "score-report",
    version,
    about = "Clinical staging and scoring from structured answers or report text",
    long_about = "Score TNM stage groupings, nephrometry and likelihood scores.\n\n\
                  Answers can be given as FIELD=VALUE pairs or pre-filled from\n\
                  free-text radiology and pathology reports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Load schemes from a manifest-verified directory instead of the
    /// embedded set (falls back to SCORE_SCHEMES_DIR).
    #[arg(long = "schemes-dir", value_name = "DIR", global = true)]
    pub schemes_dir: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the emitting module in each log line.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List available schemes.
    Schemes,

    /// Show the fields of one scheme.
    Fields(FieldsArgs),

    /// Score a set of answers.
    Score(ScoreArgs),

    /// Recognize answers in report text without scoring.
    Extract(ExtractArgs),

    /// Verify the scheme source and print a JSON summary.
    Doctor,
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Scheme id, e.g. `renal` or `tnm-kidney`.
    #[arg(value_name = "SCHEME")]
    pub scheme: String,

    /// Print field definitions as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ScoreArgs {
    #[arg(value_name = "SCHEME")]
    pub scheme: String,

    /// One answer as FIELD=VALUE. Values may use option labels or synonyms.
    #[arg(
        short = 'a',
        long = "answer",
        value_name = "FIELD=VALUE",
        value_parser = parse_answer_arg
    )]
    pub answers: Vec<(String, String)>,

    /// Pre-fill answers from report text (`-` reads stdin). Explicit
    /// `--answer` values take precedence.
    #[arg(long = "text", value_name = "FILE")]
    pub text: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Append the computed result to a JSON-lines history file.
    #[arg(long = "history", value_name = "PATH")]
    pub history: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtractArgs {
    #[arg(value_name = "SCHEME")]
    pub scheme: String,

    /// Report text file; stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print the extraction report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
