//! Timestamp detection and normalization.
//!
//! Detection walks a fixed, ordered list of patterns and takes the first
//! match. Normalization walks a second ordered list of parse formats and
//! renders the first success as RFC 3339 in UTC (`...Z`). Text that matches
//! a pattern but no parse format is kept verbatim.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Detection patterns in priority order. Bracketed forms capture the inner
/// text in group 1.
const TIMESTAMP_PATTERNS: &[&str] = &[
    // ISO-8601 with fractional seconds and optional zone
    r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+(?:Z|[+-]\d{2}:?\d{2})?",
    // ISO-8601 without fraction
    r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:Z|[+-]\d{2}:?\d{2})?",
    // space-separated with fraction
    r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d+",
    // space-separated
    r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}",
    r"\[(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?)\]",
    r"\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\]",
    // common log format: [10/Oct/2000:13:55:36 -0700]
    r"\[(\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})\]",
    r"\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}",
];

static TIMESTAMP_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TIMESTAMP_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap_or_else(|_| unreachable!()))
        .collect()
});

/// How one entry of the parse-format list interprets its input.
#[derive(Debug, Clone, Copy)]
enum ParseFormat {
    /// RFC 3339 / ISO-8601 with an explicit zone (`Z` or offset).
    Rfc3339,
    /// strptime format that includes an offset.
    Offset(&'static str),
    /// strptime format without zone information; assumed UTC.
    Civil(&'static str),
}

const PARSE_FORMATS: &[ParseFormat] = &[
    ParseFormat::Rfc3339,
    ParseFormat::Offset("%Y-%m-%dT%H:%M:%S%.f%z"),
    ParseFormat::Offset("%Y-%m-%dT%H:%M:%S%z"),
    ParseFormat::Civil("%Y-%m-%dT%H:%M:%S%.f"),
    ParseFormat::Civil("%Y-%m-%dT%H:%M:%S"),
    ParseFormat::Civil("%Y-%m-%d %H:%M:%S%.f"),
    ParseFormat::Civil("%Y-%m-%d %H:%M:%S"),
    ParseFormat::Offset("%d/%b/%Y:%H:%M:%S %z"),
];

/// A timestamp located in a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampMatch {
    /// Byte range of the whole match, brackets included.
    pub span: Range<usize>,
    /// The timestamp text itself (bracket contents for bracketed forms).
    pub text: String,
}

/// Find the first timestamp in `text`, trying patterns in priority order.
pub fn find(text: &str) -> Option<TimestampMatch> {
    TIMESTAMP_RULES.iter().find_map(|rule| {
        let caps = rule.captures(text)?;
        let whole = caps.get(0)?;
        let inner = caps.get(1).unwrap_or(whole);
        Some(TimestampMatch {
            span: whole.range(),
            text: inner.as_str().to_string(),
        })
    })
}

/// Parse `raw` with the first parse format that accepts it.
pub fn parse(raw: &str) -> Option<jiff::Timestamp> {
    let raw = raw.trim();
    PARSE_FORMATS.iter().find_map(|format| match *format {
        ParseFormat::Rfc3339 => raw.parse::<jiff::Timestamp>().ok(),
        ParseFormat::Offset(fmt) => jiff::Timestamp::strptime(fmt, raw).ok(),
        ParseFormat::Civil(fmt) => jiff::civil::DateTime::strptime(fmt, raw)
            .ok()
            .and_then(|dt| dt.to_zoned(jiff::tz::TimeZone::UTC).ok())
            .map(|zdt| zdt.timestamp()),
    })
}

/// Normalize timestamp text to RFC 3339 in UTC, e.g. `2024-06-01T12:00:00Z`.
///
/// Returns the input unchanged when no parse format accepts it.
pub fn normalize(raw: &str) -> String {
    match parse(raw) {
        Some(ts) => ts.to_string(),
        None => {
            tracing::debug!(timestamp = raw, "timestamp kept verbatim: no parse format matched");
            raw.to_string()
        }
    }
}

/// Normalize a JSON timestamp value.
///
/// Strings go through [`normalize`]; numbers are Unix epochs whose unit is
/// picked by magnitude (< 1e12 seconds, < 1e15 milliseconds, otherwise
/// nanoseconds).
pub fn from_json_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(normalize(s)),
        serde_json::Value::Number(n) => {
            let ts = if let Some(i) = n.as_i64() {
                from_epoch_integer(i)
            } else {
                n.as_f64().and_then(from_epoch_float)
            };
            Some(ts.map_or_else(|| n.to_string(), |ts| ts.to_string()))
        }
        _ => None,
    }
}

fn from_epoch_integer(value: i64) -> Option<jiff::Timestamp> {
    if value < 1_000_000_000_000 {
        jiff::Timestamp::from_second(value).ok()
    } else if value < 1_000_000_000_000_000 {
        jiff::Timestamp::from_millisecond(value).ok()
    } else {
        jiff::Timestamp::from_nanosecond(i128::from(value)).ok()
    }
}

fn from_epoch_float(value: f64) -> Option<jiff::Timestamp> {
    if value < 1e12 {
        #[allow(clippy::cast_possible_truncation)]
        let secs = value.trunc() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let nanos = (value.fract() * 1_000_000_000.0) as i32;
        jiff::Timestamp::new(secs, nanos).ok()
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let ms = value as i64;
        jiff::Timestamp::from_millisecond(ms).ok()
    }
}
