//! JSON fast path.
//!
//! A line that is a JSON object maps straight onto a [`LogEntry`] through the
//! ordered synonym tables in [`fields`], bypassing mining and extraction.
//! Remaining keys become metadata, flattened one level with dot notation.

use crate::entry::{LogEntry, Metadata, MetadataValue, insert_first};
use crate::fields;
use crate::level::Level;
use crate::timestamp;

/// Parse a JSON-object line into a record.
///
/// Returns `None` for anything that is not a JSON object (plain text, arrays,
/// scalars, broken JSON), leaving the line to the other paths.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let parsed: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    let serde_json::Value::Object(mut map) = parsed else {
        return None;
    };

    let timestamp = fields::find_and_remove(&mut map, fields::TIMESTAMP_ALIASES)
        .and_then(|(_, v)| timestamp::from_json_value(&v));

    let mut metadata = Metadata::new();

    let level = match fields::find_and_remove(&mut map, fields::LEVEL_ALIASES) {
        Some((key, value)) => {
            let level = Level::from_json_value(&value);
            if level.is_none()
                && let Some(kept) = to_metadata_value(value)
            {
                // unrecognized severities stay visible under their own key
                insert_first(&mut metadata, key, kept);
            }
            level
        }
        None => None,
    };

    let message = fields::find_and_remove(&mut map, fields::MESSAGE_ALIASES)
        .and_then(|(_, v)| value_to_string(v))
        .unwrap_or_default();

    flatten_into(&mut metadata, map);
    insert_first(&mut metadata, fields::PARSING_METHOD, fields::JSON_FAST_PATH);

    Some(LogEntry {
        timestamp,
        level,
        message,
        metadata,
        raw_data: line.to_string(),
        inherited: Default::default(),
    })
}

/// Convert a JSON value to its string representation.
fn value_to_string(v: serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Convert a JSON value to a metadata value. Nulls are dropped; arrays of
/// scalars become lists; anything else nested is kept as compact JSON.
fn to_metadata_value(v: serde_json::Value) -> Option<MetadataValue> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::Array(items) if items.iter().all(is_scalar) => Some(MetadataValue::List(
            items.into_iter().filter_map(value_to_string).collect(),
        )),
        other => value_to_string(other).map(MetadataValue::Text),
    }
}

fn is_scalar(v: &serde_json::Value) -> bool {
    !matches!(v, serde_json::Value::Array(_) | serde_json::Value::Object(_))
}

/// Flatten remaining fields 1 level using dot-notation.
///
/// `{"http":{"method":"GET","status":200}}` becomes `http.method = "GET"`
/// and `http.status = "200"`. Objects deeper than one level are kept as
/// compact JSON.
fn flatten_into(metadata: &mut Metadata, map: serde_json::Map<String, serde_json::Value>) {
    for (key, value) in map {
        match value {
            serde_json::Value::Object(nested) => {
                for (nested_key, nested_value) in nested {
                    if let Some(v) = to_metadata_value(nested_value) {
                        insert_first(metadata, format!("{key}.{nested_key}"), v);
                    }
                }
            }
            other => {
                if let Some(v) = to_metadata_value(other) {
                    insert_first(metadata, key, v);
                }
            }
        }
    }
}
