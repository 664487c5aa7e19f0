//! Statistical fingerprint of a line batch.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap_or_else(|_| unreachable!()));
static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap_or_else(|_| unreachable!()));
static HEX_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9a-fA-F]{8,}").unwrap_or_else(|_| unreachable!()));
static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap_or_else(|_| unreachable!())
});
static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][\w.-]*\s*[=:]").unwrap_or_else(|_| unreachable!()));

/// Immutable snapshot of a batch, computed once per pipeline call.
///
/// Ratios are zero for an empty batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Characteristics {
    pub total_lines: usize,
    pub avg_line_length: f64,
    pub unique_lines: usize,
    pub duplicate_ratio: f64,
    pub has_timestamps: bool,
    pub has_ips: bool,
    pub has_hex: bool,
    pub has_uuids: bool,
    pub has_json: bool,
    pub has_structured: bool,
}

impl Characteristics {
    /// Share of distinct lines in the batch; 0 for an empty batch.
    pub fn unique_ratio(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.unique_lines as f64 / self.total_lines as f64
        }
    }
}

fn any_match(re: &Regex, lines: &[&str]) -> bool {
    lines.iter().any(|line| re.is_match(line))
}

/// Compute the characteristics of `lines`.
pub fn analyze<S: AsRef<str>>(lines: &[S]) -> Characteristics {
    let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    if lines.is_empty() {
        return Characteristics::default();
    }

    let total_lines = lines.len();
    let unique_lines = lines.iter().collect::<HashSet<_>>().len();
    let total_chars: usize = lines.iter().map(|l| l.chars().count()).sum();

    Characteristics {
        total_lines,
        avg_line_length: total_chars as f64 / total_lines as f64,
        unique_lines,
        duplicate_ratio: 1.0 - unique_lines as f64 / total_lines as f64,
        has_timestamps: any_match(&DATE, &lines),
        has_ips: any_match(&IPV4, &lines),
        has_hex: any_match(&HEX_RUN, &lines),
        has_uuids: any_match(&UUID, &lines),
        has_json: lines.iter().any(|l| {
            let t = l.trim();
            t.starts_with('{') && t.ends_with('}')
        }),
        has_structured: any_match(&KEY_VALUE, &lines),
    }
}
