//! `lognorm`: normalize heterogeneous raw log lines into structured records.
//!
//! A batch of lines (plain text, semi-structured, JSON, access logs) becomes
//! an ordered sequence of [`LogEntry`] records: timestamp, level, message,
//! metadata and the raw text they came from. Plain-text batches are
//! fingerprinted, handed to a template-mining engine when one is configured,
//! and otherwise parsed by a deterministic regex extractor. Multi-line
//! records such as stack traces are stitched together, and correlation
//! fields are carried forward to the records that lack them.
//!
//! # Example
//!
//! ```
//! use lognorm::{Level, Pipeline};
//!
//! let pipeline = Pipeline::default();
//! let records = pipeline.normalize(&[
//!     "2024-06-01 12:00:00 INFO start",
//!     "2024-06-01 12:00:01 ERROR boom",
//!     "    at foo.bar(x.js:1)",
//! ]);
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].level, Some(Level::Error));
//! assert_eq!(records[1].message, "boom\nat foo.bar(x.js:1)");
//! ```

pub mod access_log;
pub mod algorithm;
pub mod analyze;
pub mod cli;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod extract;
pub mod fields;
pub mod formatter;
pub mod json;
pub mod level;
pub mod mining;
pub mod pipeline;
pub mod propagate;
pub mod stitch;
pub mod timestamp;

// Re-export primary API types for convenience.
pub use algorithm::AlgorithmId;
pub use analyze::{Characteristics, analyze};
pub use config::Config;
pub use engine::{CommandEngine, EngineError, EngineRegistry, MinedLine, TemplateEngine, Workspace};
pub use entry::{LogEntry, Metadata, MetadataValue};
pub use error::LognormError;
pub use extract::extract;
pub use level::Level;
pub use mining::EngineOutcome;
pub use pipeline::Pipeline;
