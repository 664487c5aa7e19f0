//! The orchestrator.
//!
//! [`Pipeline::parse`] runs the core over one batch: analyze, select, mine
//! (with backups, then the regex fallback), propagate, stitch.
//! [`Pipeline::normalize`] is the front door that routes JSON and access-log
//! lines to their fast paths and everything else through the core.

use crate::access_log;
use crate::algorithm;
use crate::analyze::analyze;
use crate::engine::{EngineError, EngineRegistry};
use crate::entry::LogEntry;
use crate::json;
use crate::mining::{self, EngineOutcome};
use crate::propagate::propagate;
use crate::stitch::stitch;

/// A configured normalization pipeline. Holds no per-call state, so one
/// instance can serve any number of batches.
#[derive(Debug)]
pub struct Pipeline {
    registry: EngineRegistry,
    fast_paths: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(EngineRegistry::empty())
    }
}

impl Pipeline {
    /// A pipeline mining with `registry`, fast paths enabled.
    pub fn new(registry: EngineRegistry) -> Self {
        Self {
            registry,
            fast_paths: true,
        }
    }

    /// Enable or disable the JSON and access-log fast paths in [`normalize`](Self::normalize).
    #[must_use]
    pub fn with_fast_paths(mut self, enabled: bool) -> Self {
        self.fast_paths = enabled;
        self
    }

    /// Normalize a batch that is neither JSON nor access-log lines.
    ///
    /// Blank lines are dropped; an empty or blank-only batch yields no
    /// records. The selected engine is tried first, then every backup; if
    /// none succeeds each line goes through the regex extractor on its own.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Vec<LogEntry> {
        let lines: Vec<String> = lines
            .iter()
            .map(AsRef::as_ref)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let characteristics = analyze(&lines);
        let primary = algorithm::select(&characteristics);
        tracing::debug!(?characteristics, algorithm = %primary, "selected template-mining algorithm");

        let mut mined = None;
        for id in primary.candidates() {
            match mining::invoke(&self.registry, id, &lines) {
                EngineOutcome::Success(result) => {
                    tracing::debug!(algorithm = %id, records = result.len(), "template mining succeeded");
                    mined = Some(mining::entries_from_mined(result, id, &lines));
                    break;
                }
                EngineOutcome::Failure(EngineError::Unavailable(_)) => {
                    tracing::trace!(algorithm = %id, "no engine registered");
                }
                EngineOutcome::Failure(error) => {
                    tracing::warn!(algorithm = %id, %error, "template mining failed");
                }
            }
        }

        let mut entries = mined.unwrap_or_else(|| {
            if !self.registry.is_empty() {
                tracing::warn!(lines = lines.len(), "every engine failed, using regex fallback");
            }
            mining::fallback_entries(&lines)
        });

        propagate(&mut entries);
        stitch(entries)
    }

    /// Normalize arbitrary input, preserving line order.
    ///
    /// JSON-object lines and access-log lines take their fast paths (when
    /// enabled); each maximal run of other lines is one [`parse`](Self::parse)
    /// batch.
    pub fn normalize<S: AsRef<str>>(&self, lines: &[S]) -> Vec<LogEntry> {
        let mut output = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        for line in lines.iter().map(AsRef::as_ref) {
            if line.trim().is_empty() {
                continue;
            }
            if self.fast_paths
                && let Some(entry) = json::parse_line(line).or_else(|| access_log::parse_line(line))
            {
                if !run.is_empty() {
                    output.extend(self.parse(&run));
                    run.clear();
                }
                output.push(entry);
                continue;
            }
            run.push(line);
        }
        if !run.is_empty() {
            output.extend(self.parse(&run));
        }

        output
    }
}
