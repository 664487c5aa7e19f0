//! Template-mining adapter.
//!
//! Wraps one engine invocation: scratch workspace in, [`EngineOutcome`] out.
//! Engine errors, missing artifacts, panics and degenerate output all become
//! [`EngineOutcome::Failure`]; the caller decides what to try next.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::algorithm::AlgorithmId;
use crate::engine::{EngineError, EngineRegistry, MinedLine, Workspace};
use crate::entry::{LogEntry, Metadata, insert_first, merge_metadata};
use crate::extract::extract;
use crate::fields;

/// Confidence attached to records normalized from engine output.
pub const ENGINE_CONFIDENCE: &str = "0.8";
/// Confidence attached to records produced by the regex fallback.
pub const FALLBACK_CONFIDENCE: &str = "0.5";

/// Result of one engine attempt.
#[derive(Debug)]
pub enum EngineOutcome {
    Success(Vec<MinedLine>),
    Failure(EngineError),
}

/// Run the engine registered for `id` over `lines`.
///
/// Lines are trimmed and blanks dropped before the engine sees them. The
/// workspace is removed before this returns, whatever the engine did.
pub fn invoke(registry: &EngineRegistry, id: AlgorithmId, lines: &[String]) -> EngineOutcome {
    let Some(engine) = registry.get(id) else {
        return EngineOutcome::Failure(EngineError::Unavailable(id));
    };

    let trimmed: Vec<String> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if trimmed.is_empty() {
        return EngineOutcome::Success(Vec::new());
    }

    let workspace = match Workspace::acquire() {
        Ok(ws) => ws,
        Err(e) => return EngineOutcome::Failure(e),
    };
    if let Err(e) = workspace.write_input(&trimmed) {
        return EngineOutcome::Failure(e);
    }

    let result = catch_unwind(AssertUnwindSafe(|| engine.run(&trimmed, &workspace)));
    match result {
        Err(payload) => EngineOutcome::Failure(EngineError::Panicked(panic_message(payload.as_ref()))),
        Ok(Err(e)) => EngineOutcome::Failure(e),
        Ok(Ok(mined)) if mined.is_empty() => EngineOutcome::Failure(EngineError::EmptyOutput),
        Ok(Ok(mined)) if mined.len() == 1 && trimmed.len() > 1 => {
            EngineOutcome::Failure(EngineError::DegenerateCollapse { inputs: trimmed.len() })
        }
        Ok(Ok(mined)) => EngineOutcome::Success(mined),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Normalize engine output: extract fields from each content line and tag
/// the record with its template.
///
/// `sources` are the lines the engine was given, before trimming. Each row
/// keeps its source line as `raw_data`: by position when the engine returned
/// one row per non-blank source, otherwise the first unused source whose
/// trimmed text equals the row's content.
pub fn entries_from_mined(mined: Vec<MinedLine>, id: AlgorithmId, sources: &[String]) -> Vec<LogEntry> {
    let sources: Vec<&str> = sources
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .collect();
    let by_position = mined.len() == sources.len();
    let mut used = vec![false; sources.len()];

    let mut entries = Vec::with_capacity(mined.len());
    for (i, line) in mined.into_iter().enumerate() {
        let source = if by_position {
            Some(i)
        } else {
            (0..sources.len()).find(|&j| !used[j] && sources[j].trim() == line.content.trim())
        };
        let raw_data = match source {
            Some(j) => {
                used[j] = true;
                sources[j].to_string()
            }
            None => line.content.clone(),
        };

        let mut adapter = Metadata::new();
        insert_first(&mut adapter, fields::ML_TEMPLATE, line.template);
        insert_first(&mut adapter, fields::ML_CONFIDENCE, ENGINE_CONFIDENCE);
        insert_first(&mut adapter, fields::PARSING_METHOD, id.as_str());
        let mut entry = with_adapter_metadata(extract(&line.content), adapter);
        entry.raw_data = raw_data;
        entries.push(entry);
    }
    entries
}

/// Extract every non-blank line independently, with no mining involved.
pub fn fallback_entries<S: AsRef<str>>(lines: &[S]) -> Vec<LogEntry> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut adapter = Metadata::new();
            insert_first(&mut adapter, fields::ML_CONFIDENCE, FALLBACK_CONFIDENCE);
            insert_first(&mut adapter, fields::PARSING_METHOD, fields::REGEX_FALLBACK);
            with_adapter_metadata(extract(line), adapter)
        })
        .collect()
}

fn with_adapter_metadata(mut entry: LogEntry, mut adapter: Metadata) -> LogEntry {
    merge_metadata(&mut adapter, std::mem::take(&mut entry.metadata));
    entry.metadata = adapter;
    entry
}
