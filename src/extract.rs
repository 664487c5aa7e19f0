//! Deterministic single-line field extraction.
//!
//! [`extract`] turns one raw line into a [`LogEntry`] by peeling fields off a
//! working copy of the line in a fixed order: timestamp, level, bracketed
//! groups, `key=value` tokens. Every matched span is removed as it is found,
//! so nothing extracted into a field is left behind in the message.
//!
//! This is the universal fallback for batches no mining engine could handle,
//! and also normalizes each line an engine did handle.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{LogEntry, Metadata, insert_first};
use crate::level::Level;
use crate::timestamp;

/// Level patterns in priority order; group 1 is the keyword.
const LEVEL_PATTERNS: &[&str] = &[
    r"(?i)\[\s*(WARNING|WARN|ERROR|ERR|FATAL|CRITICAL|CRIT|DEBUG|INFO|TRACE)\s*\]",
    r"(?i)\b(WARNING|WARN|ERROR|FATAL|CRITICAL|CRIT|DEBUG|INFO|TRACE)\b",
    r"(?i)\blevel\s*[=:]\s*(WARNING|WARN|ERROR|ERR|FATAL|CRITICAL|CRIT|DEBUG|INFO|TRACE)\b",
];

static LEVEL_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    LEVEL_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|_| unreachable!()))
        .collect()
});

/// A `level=` / `level:` prefix directly in front of a bare keyword.
static LEVEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blevel\s*[=:]\s*$").unwrap_or_else(|_| unreachable!()));

static BRACKET_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap_or_else(|_| unreachable!()));

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-zA-Z_][a-zA-Z0-9_]*)=(\S+)").unwrap_or_else(|_| unreachable!()));

static COLON_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*:\s*").unwrap_or_else(|_| unreachable!()));

static LEADING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s:;,\-]+").unwrap_or_else(|_| unreachable!()));

/// Extract a structured record from one raw line.
///
/// `raw_data` is the line exactly as given; matching works on the trimmed
/// text.
pub fn extract(line: &str) -> LogEntry {
    let original = line.trim();
    let mut working = original.to_string();

    let timestamp = take_timestamp(&mut working);
    let level = take_level(&mut working);
    let mut metadata = Metadata::new();
    take_bracket_groups(&mut working, &mut metadata);
    take_key_values(&mut working, &mut metadata);

    let mut message = cleanup(&working);

    // Degenerate-message recovery: keep the full line instead of a husk.
    if (message.is_empty() && (timestamp.is_some() || level.is_some()))
        || (level.is_some() && timestamp.is_none() && message != original)
    {
        message = original.to_string();
    }

    LogEntry {
        timestamp,
        level,
        message,
        metadata,
        raw_data: line.to_string(),
        inherited: Default::default(),
    }
}

/// Find the first pattern in `rules` that matches `text`.
///
/// Returns the byte range of the whole match and the text of group 1 (or the
/// whole match when the pattern has no group).
fn first_match<'t>(rules: &[Regex], text: &'t str) -> Option<(Range<usize>, &'t str)> {
    rules.iter().find_map(|rule| {
        let caps = rule.captures(text)?;
        let whole = caps.get(0)?;
        let inner = caps.get(1).unwrap_or(whole);
        Some((whole.range(), inner.as_str()))
    })
}

/// Widen `span` over a directly enclosing `[`...`]` pair.
fn widen_brackets(text: &str, span: Range<usize>) -> Range<usize> {
    if text[..span.start].ends_with('[') && text[span.end..].starts_with(']') {
        span.start - 1..span.end + 1
    } else {
        span
    }
}

/// Replace `span` with a single space so neighbouring words stay apart.
fn remove_span(text: &mut String, span: Range<usize>) {
    text.replace_range(span, " ");
}

fn take_timestamp(working: &mut String) -> Option<String> {
    let found = timestamp::find(working)?;
    let span = widen_brackets(working, found.span);
    remove_span(working, span);
    Some(timestamp::normalize(&found.text))
}

fn take_level(working: &mut String) -> Option<Level> {
    let (span, keyword) = first_match(&LEVEL_RULES, working)?;
    let level = Level::from_str_loose(keyword)?;
    let mut span = widen_brackets(working, span);
    if let Some(prefix) = LEVEL_PREFIX.find(&working[..span.start]) {
        span.start = prefix.start();
    }
    remove_span(working, span);
    Some(level)
}

/// Pull every `[...]` group out of `working`, left to right.
///
/// `[k=v]` becomes `k = v`; `[a 1: b 2]` becomes `a = 1`, `b = 2`; anything
/// else is stored as `tag_N`, N being one more than the current metadata size.
fn take_bracket_groups(working: &mut String, metadata: &mut Metadata) {
    while let Some(caps) = BRACKET_GROUP.captures(working) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let span = whole.range();
        let content = inner.as_str().trim().to_string();
        remove_span(working, span);
        if content.is_empty() {
            continue;
        }

        if let Some((key, value)) = content.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                insert_first(metadata, key, value.trim());
                continue;
            }
        } else if content.contains(':') && insert_colon_pairs(&content, metadata) {
            continue;
        }
        let tag = format!("tag_{}", metadata.len() + 1);
        insert_first(metadata, tag, content);
    }
}

/// Split `a 1: b 2` into `a = 1`, `b = 2`. Returns whether anything was stored.
fn insert_colon_pairs(content: &str, metadata: &mut Metadata) -> bool {
    let mut stored = false;
    for part in COLON_SPLIT.split(content) {
        if let Some((key, value)) = part.trim().split_once(' ') {
            insert_first(metadata, key, value.trim());
            stored = true;
        }
    }
    stored
}

fn take_key_values(working: &mut String, metadata: &mut Metadata) {
    while let Some(caps) = KEY_VALUE.captures(working) {
        let (Some(whole), Some(key), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        let span = whole.range();
        let key = key.as_str().to_string();
        let value = value.as_str().trim_end_matches([',', ';']).to_string();
        remove_span(working, span);
        insert_first(metadata, key, value);
    }
}

/// Drop every `|`, strip leading punctuation and collapse whitespace.
fn cleanup(working: &str) -> String {
    let without_pipes = working.replace('|', "");
    let stripped = LEADING_PUNCTUATION.replace(&without_pipes, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
