//! Severity levels with canonicalization, display, and colorization.
//!
//! Every source spells severities differently (`WARNING`, `err`, `CRIT`,
//! numeric pino levels). All of them collapse onto the six canonical
//! [`Level`] variants, which serialize as their upper-case names.

use std::fmt;

use owo_colors::Style;
use serde::{Deserialize, Serialize};

/// Canonical log level enumeration.
///
/// Ordered by severity (ascending) so `>=` filtering works via [`Ord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// Canonical upper-case name (`"WARN"`, `"ERROR"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// 5-character display badge, right-justified (e.g. `" INFO"`, `"ERROR"`).
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => " INFO",
            Self::Warn => " WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// The blank badge (5 spaces) used when a record has no level.
    pub const fn blank_badge() -> &'static str {
        "     "
    }

    /// Badge [`Style`] when colors are enabled.
    pub const fn style(self) -> Style {
        match self {
            Self::Trace => Style::new().cyan().bold(),
            Self::Debug => Style::new().blue().bold(),
            Self::Info => Style::new().green().bold(),
            Self::Warn => Style::new().yellow().bold(),
            Self::Error => Style::new().red().bold(),
            Self::Fatal => Style::new().magenta().bold(),
        }
    }

    /// Parse a level keyword, case-insensitive.
    ///
    /// `WARN`/`WARNING` map to [`Warn`](Self::Warn), `ERR`/`ERROR` to
    /// [`Error`](Self::Error), and `CRIT`/`CRITICAL`/`FATAL` to
    /// [`Fatal`](Self::Fatal). A handful of framework abbreviations are
    /// accepted as well. Returns `None` for anything else.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" | "trc" => Some(Self::Trace),
            "debug" | "dbg" => Some(Self::Debug),
            "info" | "inf" | "information" => Some(Self::Info),
            "warn" | "warning" | "wrn" => Some(Self::Warn),
            "error" | "err" => Some(Self::Error),
            "fatal" | "critical" | "crit" | "panic" | "emerg" | "emergency" => Some(Self::Fatal),
            _ => None,
        }
    }

    /// Map a bunyan/pino numeric level onto the nearest lower [`Level`].
    ///
    /// 10 = trace, 20 = debug, 30 = info, 40 = warn, 50 = error, 60 = fatal.
    pub const fn from_numeric(n: i64) -> Self {
        match n {
            ..=14 => Self::Trace,
            15..=24 => Self::Debug,
            25..=34 => Self::Info,
            35..=44 => Self::Warn,
            45..=54 => Self::Error,
            55.. => Self::Fatal,
        }
    }

    /// Parse a level from a JSON value (string keyword or numeric level).
    pub fn from_json_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::from_str_loose(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::from_numeric(i))
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    n.as_f64().map(|f| Self::from_numeric(f as i64))
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
