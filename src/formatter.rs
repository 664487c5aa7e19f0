//! Output rendering for normalized records.
//!
//! Three formats:
//! - NDJSON: one serialized [`LogEntry`] per line
//! - JSON: one array holding every record
//! - Pretty: fblog-style text with colored level badges and metadata on
//!   separate lines with right-justified keys

use std::fmt::Write as _;
use std::io::Write;

use owo_colors::OwoColorize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::entry::{LogEntry, MetadataValue};
use crate::error::LognormError;
use crate::level::Level;

/// Minimum width for metadata key alignment (right-justified).
const KEY_MIN_WIDTH: usize = 25;

/// Indentation for the second and later lines of a stitched message.
const CONTINUATION_INDENT: &str = "    ";

/// Whether a record passes the configured minimum level.
///
/// Records without a level always pass.
pub fn should_keep(entry: &LogEntry, config: &Config) -> bool {
    match (config.min_level, entry.level) {
        (Some(min), Some(level)) => level >= min,
        _ => true,
    }
}

/// Write the records that pass the level filter in the configured format.
pub fn write_entries<W: Write>(
    entries: &[LogEntry],
    config: &Config,
    use_color: bool,
    writer: &mut W,
) -> Result<(), LognormError> {
    let kept: Vec<&LogEntry> = entries.iter().filter(|e| should_keep(e, config)).collect();

    match config.output {
        OutputFormat::Ndjson => {
            for entry in kept {
                serde_json::to_writer(&mut *writer, entry)?;
                writer.write_all(b"\n")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &kept)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Pretty => {
            let mut out = String::with_capacity(256);
            for entry in kept {
                out.clear();
                format_entry(entry, config, use_color, &mut out);
                out.push('\n');
                writer.write_all(out.as_bytes())?;
            }
        }
    }

    Ok(())
}

/// Format a [`LogEntry`] into human-readable output.
///
/// ```text
/// 2024-06-01T12:00:01Z  ERROR: boom
///     at foo.bar(x.js:1)
///             parsing_method: regex_fallback
/// ```
pub fn format_entry(entry: &LogEntry, config: &Config, use_color: bool, out: &mut String) {
    // Timestamp (bold when colored)
    if let Some(ref ts) = entry.timestamp {
        if use_color {
            let _ = write!(out, "{}  ", ts.bold());
        } else {
            out.push_str(ts);
            out.push_str("  ");
        }
    }

    // Level badge + colon
    if let Some(level) = entry.level {
        let badge = level.badge();
        if use_color {
            let _ = write!(out, "{}:", badge.style(level.style()));
        } else {
            out.push_str(badge);
            out.push(':');
        }
    } else {
        out.push_str(Level::blank_badge());
        out.push(':');
    }

    // Message; stitched lines go underneath, indented
    let mut lines = entry.message.lines();
    if let Some(first) = lines.next() {
        out.push(' ');
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(CONTINUATION_INDENT);
        out.push_str(line);
    }

    // Metadata: each on a new line with right-justified key
    for (key, value) in &entry.metadata {
        let val_str = format_value(value);
        let val_display = truncate_value(&val_str, config.max_field_length);

        if use_color {
            let _ = write!(
                out,
                "\n{}: {}",
                format!("{key:>KEY_MIN_WIDTH$}").truecolor(150, 150, 150).bold(),
                val_display
            );
        } else {
            let _ = write!(out, "\n{key:>KEY_MIN_WIDTH$}: {val_display}");
        }
    }
}

/// Format a metadata value for display: text as-is, lists bracketed and
/// comma-separated.
fn format_value(value: &MetadataValue) -> String {
    match value {
        MetadataValue::Text(s) => s.clone(),
        MetadataValue::List(items) => format!("[{}]", items.join(", ")),
    }
}

/// Truncate a value string to `max_len` characters, appending `…` if truncated.
///
/// If `max_len` is `0`, no truncation is applied.
fn truncate_value(s: &str, max_len: usize) -> String {
    if max_len == 0 || s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len).collect();
    format!("{truncated}…")
}
