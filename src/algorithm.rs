//! Template-mining strategies and the rule list that picks one per batch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyze::Characteristics;

/// One template-mining strategy, backed by one external engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmId {
    /// General-purpose fixed-depth parse tree.
    Drain,
    /// Longest-common-subsequence streaming; suits highly redundant batches.
    Spell,
    /// Iterative partitioning; suits structured system logs.
    Iplom,
    /// Frequent-word clustering; suits identifier-heavy batches.
    LogCluster,
    /// Hierarchical clustering; suits highly diverse batches.
    LogMine,
}

/// Order in which engines are tried after the selected one fails.
pub const BACKUP_ORDER: &[AlgorithmId] = &[
    AlgorithmId::Drain,
    AlgorithmId::Spell,
    AlgorithmId::Iplom,
    AlgorithmId::LogCluster,
    AlgorithmId::LogMine,
];

impl AlgorithmId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drain => "drain",
            Self::Spell => "spell",
            Self::Iplom => "iplom",
            Self::LogCluster => "logcluster",
            Self::LogMine => "logmine",
        }
    }

    /// The selected algorithm followed by every backup not yet tried.
    pub fn candidates(self) -> Vec<Self> {
        std::iter::once(self)
            .chain(BACKUP_ORDER.iter().copied().filter(|&id| id != self))
            .collect()
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a strategy from a batch fingerprint. Rules are evaluated in order and
/// the first match wins.
pub fn select(c: &Characteristics) -> AlgorithmId {
    if c.has_json {
        AlgorithmId::Drain
    } else if c.duplicate_ratio > 0.7 {
        AlgorithmId::Spell
    } else if c.total_lines > 0 && c.unique_ratio() > 0.8 {
        AlgorithmId::LogMine
    } else if c.has_timestamps && c.has_ips {
        AlgorithmId::Iplom
    } else if c.has_hex || c.has_uuids {
        AlgorithmId::LogCluster
    } else {
        AlgorithmId::Drain
    }
}
