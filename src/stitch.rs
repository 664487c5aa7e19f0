//! Multiline stitching.
//!
//! Stack traces and wrapped messages arrive as one record per physical line.
//! [`stitch`] folds continuation records into the record they continue, in a
//! single left-to-right pass holding one open record.
//!
//! Only a record's own timestamp and level count here; values the
//! propagator filled in are ignored, otherwise every continuation line would
//! look like the start of a record.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{LogEntry, merge_metadata};
use crate::fields;
use crate::timestamp;

/// Stack-trace and exception prefixes of a continuation message.
const CONTINUATION_PREFIXES: &[&str] = &[
    r"^Traceback\b",
    r"^at\s",
    r"^Caused by:",
    r"^\.\.\.\s*\d+\s+more",
    r"^[A-Za-z_][\w.$]*(?:Error|Exception):",
];

/// Lower-case substrings marking a continuation message.
const CONTINUATION_INDICATORS: &[&str] = &[
    "...",
    "continued",
    "stack trace",
    "caused by",
    "suppressed",
    "traceback",
    "exception",
    "failed",
];

/// Line openings that always begin a new record.
const RECORD_START_PATTERNS: &[&str] = &[
    r"^\d{4}-\d{2}-\d{2}",
    r"^\[\d{4}-\d{2}-\d{2}",
    r"^\d{2}/\w{3}/\d{4}",
    r"^\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}",
    r"(?i)^\[\s*(?:TRACE|DEBUG|INFO|WARN|WARNING|ERROR|ERR|FATAL|CRITICAL|CRIT)\s*\]",
    r"(?i)^(?:TRACE|DEBUG|INFO|WARN|WARNING|ERROR|ERR|FATAL|CRITICAL|CRIT):",
];

static CONTINUATION_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CONTINUATION_PREFIXES
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|_| unreachable!()))
        .collect()
});

static RECORD_START_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    RECORD_START_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|_| unreachable!()))
        .collect()
});

/// Words in a message that mark the start of a new stack trace.
const STACK_TRACE_MARKERS: &[&str] = &["Exception", "Error", "Traceback"];

/// Whether a record continues the previous one.
///
/// True when the raw line is indented, the message opens with a stack-trace
/// prefix, or the message mentions one of the continuation indicators.
pub fn is_continuation(entry: &LogEntry) -> bool {
    if entry.raw_data.starts_with(char::is_whitespace) {
        return true;
    }
    let message = entry.message.trim_start();
    if CONTINUATION_RULES.iter().any(|re| re.is_match(message)) {
        return true;
    }
    let lower = message.to_lowercase();
    CONTINUATION_INDICATORS.iter().any(|needle| lower.contains(needle))
}

/// Whether the raw line opens with a date or level prefix.
pub fn starts_record(raw: &str) -> bool {
    RECORD_START_RULES.iter().any(|re| re.is_match(raw))
}

fn is_timestamp_only(entry: &LogEntry) -> bool {
    let Some(ts) = entry.own_timestamp() else {
        return false;
    };
    let message = entry.message.trim();
    if message.is_empty() || message == ts {
        return true;
    }
    let bare = message.trim_start_matches('[').trim_end_matches(']');
    timestamp::find(bare).is_some_and(|m| m.span == (0..bare.len()))
}

fn is_new_stack_trace(entry: &LogEntry) -> bool {
    entry.own_timestamp().is_some()
        && entry.own_level().is_some()
        && STACK_TRACE_MARKERS.iter().any(|m| entry.message.contains(m))
}

/// What to do with an incoming record given the open one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Absorb,
    Append,
    Start,
}

fn decide(current: &LogEntry, next: &LogEntry) -> Decision {
    if is_timestamp_only(current) && next.own_timestamp().is_none() && !next.message.trim().is_empty() {
        return Decision::Absorb;
    }
    if is_new_stack_trace(next) || next.own_timestamp().is_some() || starts_record(&next.raw_data) {
        return Decision::Start;
    }
    if is_continuation(next) {
        return Decision::Append;
    }
    match (current.meta_str(fields::ML_TEMPLATE), next.meta_str(fields::ML_TEMPLATE)) {
        (Some(a), Some(b)) if a == b => Decision::Append,
        _ => Decision::Start,
    }
}

fn append(current: &mut LogEntry, next: LogEntry) {
    current.message.push('\n');
    current.message.push_str(&next.message);
    current.raw_data.push('\n');
    current.raw_data.push_str(&next.raw_data);
    merge_metadata(&mut current.metadata, next.metadata);
}

fn absorb(current: &mut LogEntry, next: LogEntry) {
    current.message = next.message;
    current.raw_data.push('\n');
    current.raw_data.push_str(&next.raw_data);
    if current.own_level().is_none() && next.level.is_some() {
        current.level = next.level;
        current.inherited.level = next.inherited.level;
    }
    merge_metadata(&mut current.metadata, next.metadata);
}

/// Merge continuation records into the records they continue.
///
/// A batch in which every record has its own timestamp and level is already
/// one record per line and is returned unchanged. Afterwards, any record
/// still missing a level takes the level of the record right before it.
pub fn stitch(entries: Vec<LogEntry>) -> Vec<LogEntry> {
    if entries
        .iter()
        .all(|e| e.own_timestamp().is_some() && e.own_level().is_some())
    {
        return entries;
    }

    let mut output: Vec<LogEntry> = Vec::with_capacity(entries.len());
    let mut current: Option<LogEntry> = None;

    for next in entries {
        let Some(mut open) = current.take() else {
            current = Some(next);
            continue;
        };
        let decision = decide(&open, &next);
        tracing::trace!(?decision, line = %next.raw_data, "stitch");
        match decision {
            Decision::Absorb => absorb(&mut open, next),
            Decision::Append => append(&mut open, next),
            Decision::Start => {
                output.push(open);
                current = Some(next);
                continue;
            }
        }
        current = Some(open);
    }
    output.extend(current);

    for i in 1..output.len() {
        if output[i].level.is_none() && output[i - 1].level.is_some() {
            output[i].level = output[i - 1].level;
            output[i].inherited.level = true;
        }
    }

    output
}
