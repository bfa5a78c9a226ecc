//! The [`Finding`] produced by the Pattern Executor (§3, §4.6.4).

use serde::{Deserialize, Serialize};

/// Granularity a pattern operates at, and that a [`Finding`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// A single file.
    File,
    /// An unordered pair of files.
    FilePair,
    /// A single module.
    Module,
    /// An unordered pair of modules.
    ModulePair,
    /// A single directory.
    Directory,
    /// The whole codebase.
    Codebase,
}

/// Estimated remediation effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effort {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
}

/// A single piece of numeric evidence backing a finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Name of the signal this evidence cites.
    pub signal_name: String,
    /// Raw value of the signal.
    pub value: f64,
    /// Percentile rank of the signal, if the tier supports percentiles.
    pub percentile: Option<f64>,
    /// Human-readable description of what this evidence means.
    pub description: String,
}

/// A single code-quality finding (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the pattern that produced this finding (e.g. `"god_file"`).
    pub pattern_name: String,
    /// Files this finding targets; always non-empty and always a subset of
    /// `SignalField::per_file`'s keys (invariant 1).
    pub files: Vec<String>,
    /// Scope this finding was produced at.
    pub scope: Scope,
    /// Severity in `[0, 1]`.
    pub severity: f64,
    /// Confidence in `[0, 1]`, derived from threshold margins (§4.6.4).
    pub confidence: f64,
    /// Supporting numeric evidence.
    pub evidence: Vec<Evidence>,
    /// Human-readable remediation suggestion.
    pub suggestion: String,
    /// Estimated remediation effort.
    pub effort: Effort,
}

impl Finding {
    /// Stable secondary sort key used to make ranking byte-identical across
    /// runs over the same input (§5): pattern name, then the first target
    /// path.
    pub fn stable_key(&self) -> (String, String) {
        (
            self.pattern_name.clone(),
            self.files.first().cloned().unwrap_or_default(),
        )
    }
}
