//! Error types for the `lognorm` application.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Engine failures have
//! their own type, [`EngineError`](crate::engine::EngineError), and never
//! reach this level.

use thiserror::Error;

/// Errors that can occur in `lognorm`.
///
/// Maps to exit codes: [`Config`](Self::Config) and [`Toml`](Self::Toml) →
/// exit 1, [`Io`](Self::Io) and [`Json`](Self::Json) → exit 2.
#[derive(Debug, Error)]
pub enum LognormError {
    /// Configuration error (invalid flag value, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failure serializing output records.
    #[error("output error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LognormError {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Toml(_) => 1,
            Self::Io(_) | Self::Json(_) => 2,
        }
    }
}
