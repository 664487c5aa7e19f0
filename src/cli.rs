//! Command-line argument definitions for `lognorm`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Normalize raw log lines into structured records.
///
/// Reads log lines from files (or stdin), detects timestamps, levels,
/// metadata and multi-line records, and writes one structured record per
/// logical log entry.
#[derive(Debug, Parser)]
#[command(name = "lognorm", version, about, long_about = None)]
pub struct Cli {
    /// Input files. Reads stdin when none are given.
    pub files: Vec<PathBuf>,

    /// Control color output (pretty format only).
    ///
    /// `auto` enables colors only when stdout is a TTY and `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum)]
    pub color: Option<ColorMode>,

    /// Minimum severity level to output.
    ///
    /// Records below this level are dropped. Records without a level are kept.
    #[arg(short = 'l', long, value_parser = parse_level_arg)]
    pub level: Option<String>,

    /// Output format.
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Maximum character length for metadata values in pretty output.
    ///
    /// Values exceeding this length are truncated with `…`.
    /// Set to `0` to disable truncation.
    #[arg(short = 'M', long)]
    pub max_field_length: Option<usize>,

    /// External template-mining program.
    ///
    /// Invoked as `<program> [--engine-arg ...] --algorithm <id> --params <json>
    /// --input <file> --output <dir>`. Without it, every batch goes through
    /// regex extraction.
    #[arg(long)]
    pub engine_command: Option<PathBuf>,

    /// Extra argument passed to the engine program (repeatable).
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Send JSON and access-log lines through the full pipeline too.
    #[arg(long)]
    pub no_fast_paths: bool,

    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Diagnostics on stderr: `-v` info, `-vv` debug, `-vvv` trace.
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Enable colors only when stdout is a TTY.
    Auto,
    /// Always enable colors.
    Always,
    /// Never enable colors.
    Never,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON record per line.
    Ndjson,
    /// A single JSON array.
    Json,
    /// Human-readable, optionally colorized text.
    Pretty,
}

/// Parse level argument as case-insensitive string.
fn parse_level_arg(s: &str) -> Result<String, String> {
    let lower = s.to_lowercase();
    match lower.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "fatal" => Ok(lower),
        _ => Err(format!(
            "invalid level '{s}': expected one of trace, debug, info, warn, error, fatal"
        )),
    }
}
