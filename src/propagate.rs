//! Forward-fill of timestamp, level and correlation identifiers.

use std::collections::HashMap;

use crate::entry::{LogEntry, MetadataValue};
use crate::fields::CORRELATION_KEYS;
use crate::level::Level;

/// Fill missing tracked fields from the nearest preceding record that had
/// them.
///
/// One left-to-right pass: each record first updates the last-seen table
/// with whatever tracked fields it carries, then takes the missing ones from
/// the table. Filled timestamps and levels are flagged as inherited.
pub fn propagate(entries: &mut [LogEntry]) {
    let mut last_timestamp: Option<String> = None;
    let mut last_level: Option<Level> = None;
    let mut last_seen: HashMap<&'static str, MetadataValue> = HashMap::new();

    for entry in entries.iter_mut() {
        match &entry.timestamp {
            Some(ts) => last_timestamp = Some(ts.clone()),
            None => {
                if let Some(ts) = &last_timestamp {
                    entry.timestamp = Some(ts.clone());
                    entry.inherited.timestamp = true;
                }
            }
        }

        match entry.level {
            Some(level) => last_level = Some(level),
            None => {
                if last_level.is_some() {
                    entry.level = last_level;
                    entry.inherited.level = true;
                }
            }
        }

        for &key in CORRELATION_KEYS {
            match entry.metadata.get(key) {
                Some(value) => {
                    last_seen.insert(key, value.clone());
                }
                None => {
                    if let Some(value) = last_seen.get(key) {
                        entry.metadata.insert(key.to_string(), value.clone());
                    }
                }
            }
        }
    }
}
