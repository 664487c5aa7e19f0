//! Field-name tables shared across the pipeline.
//!
//! JSON synonym lists are ordered; the first key present in an object wins.

/// Keys accepted as the timestamp of a JSON record.
pub const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "ts", "time", "date", "datetime", "@timestamp"];

/// Keys accepted as the level of a JSON record.
pub const LEVEL_ALIASES: &[&str] = &["level", "severity", "log_level", "lvl", "priority"];

/// Keys accepted as the message of a JSON record.
pub const MESSAGE_ALIASES: &[&str] = &["message", "msg", "log", "log_message", "text", "body", "content"];

/// Metadata keys forward-filled by the propagator, besides timestamp and level.
pub const CORRELATION_KEYS: &[&str] = &[
    "trace_id",
    "request_id",
    "correlation_id",
    "session_id",
    "user_id",
    "process_id",
];

/// Template assigned by a mining engine.
pub const ML_TEMPLATE: &str = "ml_template";
/// Confidence attached to a record by the mining adapter.
pub const ML_CONFIDENCE: &str = "ml_confidence";
/// Which path produced the record (`drain`, `spell`, ..., `regex_fallback`).
pub const PARSING_METHOD: &str = "parsing_method";

/// `parsing_method` value for records produced by the regex fallback.
pub const REGEX_FALLBACK: &str = "regex_fallback";
/// `parsing_method` value for records produced by the JSON fast path.
pub const JSON_FAST_PATH: &str = "json";
/// `parsing_method` value for records produced by the access-log fast path.
pub const ACCESS_LOG_FAST_PATH: &str = "access_log";

/// Look up the first matching alias key in a JSON object.
///
/// Returns the key name and removes it from the map if found.
pub fn find_and_remove(
    map: &mut serde_json::Map<String, serde_json::Value>,
    aliases: &[&str],
) -> Option<(String, serde_json::Value)> {
    for &alias in aliases {
        if let Some(val) = map.remove(alias) {
            return Some((alias.to_string(), val));
        }
    }
    None
}
