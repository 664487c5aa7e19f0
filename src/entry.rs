//! The normalized record produced by every path through the crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// A metadata value: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

impl MetadataValue {
    /// The value as a single string, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Metadata keyed by field name; keys are unique and ordered alphabetically.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Insert `value` under `key` unless the key is already present.
///
/// Returns `true` if the value was written. This is the only way records
/// gain metadata, so the first write always wins.
pub fn insert_first(metadata: &mut Metadata, key: impl Into<String>, value: impl Into<MetadataValue>) -> bool {
    match metadata.entry(key.into()) {
        std::collections::btree_map::Entry::Vacant(slot) => {
            slot.insert(value.into());
            true
        }
        std::collections::btree_map::Entry::Occupied(_) => false,
    }
}

/// Merge `other` into `target` without overwriting existing keys.
pub fn merge_metadata(target: &mut Metadata, other: Metadata) {
    for (key, value) in other {
        insert_first(target, key, value);
    }
}

/// Which of a record's fields were filled in from an earlier record rather
/// than extracted from its own text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inherited {
    pub timestamp: bool,
    pub level: bool,
}

/// One structured log record.
///
/// `raw_data` always holds the text that contributed to the record; stitched
/// records join their lines with `\n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp, or the raw matched text when it could not be normalized.
    pub timestamp: Option<String>,
    pub level: Option<Level>,
    pub message: String,
    pub metadata: Metadata,
    #[serde(rename = "rawData")]
    pub raw_data: String,
    #[serde(skip)]
    pub inherited: Inherited,
}

impl LogEntry {
    /// A record with only a message and its raw source text.
    pub fn new(message: impl Into<String>, raw_data: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            level: None,
            message: message.into(),
            metadata: Metadata::new(),
            raw_data: raw_data.into(),
            inherited: Inherited::default(),
        }
    }

    /// The timestamp extracted from this record's own text, if any.
    pub fn own_timestamp(&self) -> Option<&str> {
        if self.inherited.timestamp {
            None
        } else {
            self.timestamp.as_deref()
        }
    }

    /// The level extracted from this record's own text, if any.
    pub fn own_level(&self) -> Option<Level> {
        if self.inherited.level { None } else { self.level }
    }

    /// Look up a metadata value as a string.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_text)
    }
}
