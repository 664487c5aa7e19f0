use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lognorm::cli::{Cli, ColorMode};
use lognorm::config::Config;
use lognorm::error::LognormError;
use lognorm::formatter::write_entries;

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so upstream writers get a clean
    // SIGPIPE signal instead of a BrokenPipeError when lognorm exits early.
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lognorm: {e}");
            return ExitCode::from(1);
        }
    };

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(LognormError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lognorm: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(2))
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), LognormError> {
    let lines = if cli.files.is_empty() {
        read_lines(io::stdin().lock())?
    } else {
        let mut lines = Vec::new();
        for path in &cli.files {
            let file = File::open(path).map_err(|e| {
                LognormError::Io(io::Error::new(e.kind(), format!("{}: {e}", path.display())))
            })?;
            lines.extend(read_lines(BufReader::new(file))?);
        }
        lines
    };
    tracing::info!(lines = lines.len(), "input read");

    let entries = config.pipeline().normalize(&lines);
    tracing::info!(records = entries.len(), "normalized");

    let use_color = resolve_color_mode(config.color_mode);
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_entries(&entries, config, use_color, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Read every line, skipping lines that are not valid UTF-8.
fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>, LognormError> {
    let mut lines = Vec::new();
    for line_result in reader.lines() {
        match line_result {
            Ok(l) => lines.push(l),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(lines)
}

/// Diagnostics go to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(format!("lognorm={default_level}"))),
        )
        .init();
}

fn resolve_color_mode(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            let stdout = io::stdout();
            if !stdout.is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors.
/// Restoring `SIG_DFL` lets the OS handle the signal normally when the
/// downstream reader goes away.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
