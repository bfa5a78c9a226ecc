//! Run settings (§6) — the single configuration entry point.
//!
//! Every field has a default; callers override only what they need, then
//! call [`Settings::validate`] before handing the struct to
//! [`crate::api::analyze`]. This mirrors the teacher's `ValknutConfig` +
//! `core::config::validation` split: defaults live on the struct, checks
//! live in one place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::{CodeloomError, Result};

/// Per-pattern threshold overrides (§6: `thresholds.*`).
///
/// Keyed by pattern name (lowercase, matching [`crate::patterns::Pattern::name`]),
/// value is a map from threshold-parameter name (e.g. `"pagerank_pctl"`) to
/// its overridden value.
pub type ThresholdOverrides = HashMap<String, HashMap<String, f64>>;

/// Composite risk weights (§4.6.3); must sum to `1.0 +/- 0.01`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskWeights {
    /// Weight on PageRank percentile.
    pub pagerank: f64,
    /// Weight on blast-radius percentile.
    pub blast_radius: f64,
    /// Weight on cognitive-load percentile.
    pub cognitive_load: f64,
    /// Weight on instability.
    pub instability: f64,
    /// Weight on (inverted) bus factor.
    pub bus_factor: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            pagerank: 0.25,
            blast_radius: 0.20,
            cognitive_load: 0.20,
            instability: 0.20,
            bus_factor: 0.15,
        }
    }
}

impl RiskWeights {
    fn sum(&self) -> f64 {
        self.pagerank + self.blast_radius + self.cognitive_load + self.instability + self.bus_factor
    }
}

/// Absolute percentile floors (§4.6.2), keyed by signal name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalFloors {
    /// Floor for `pagerank`.
    pub pagerank: f64,
    /// Floor for `blast_radius_size`.
    pub blast_radius_size: f64,
    /// Floor for `cognitive_load`.
    pub cognitive_load: f64,
    /// Floor for `lines`.
    pub lines: f64,
}

impl Default for SignalFloors {
    fn default() -> Self {
        Self {
            pagerank: 0.005,
            blast_radius_size: 5.0,
            cognitive_load: 10.0,
            lines: 100.0,
        }
    }
}

impl SignalFloors {
    /// Floor for a named signal, if one is defined.
    pub fn floor_for(&self, signal_name: &str) -> Option<f64> {
        match signal_name {
            "pagerank" => Some(self.pagerank),
            "blast_radius_size" => Some(self.blast_radius_size),
            "cognitive_load" => Some(self.cognitive_load),
            "lines" => Some(self.lines),
            _ => None,
        }
    }
}

/// PageRank tuning (§6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageRankSettings {
    /// Damping factor.
    pub damping: f64,
    /// Maximum iterations.
    pub iterations: usize,
    /// Convergence tolerance.
    pub tolerance: f64,
}

impl Default for PageRankSettings {
    fn default() -> Self {
        Self {
            damping: 0.85,
            iterations: 20,
            tolerance: 1e-6,
        }
    }
}

/// Resource limits (§5).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceLimits {
    /// Maximum individual file size, in megabytes.
    pub max_file_size_mb: u64,
    /// Maximum total files to scan.
    pub max_files: usize,
    /// Allow hidden (dotfile) files to be scanned.
    pub allow_hidden_files: bool,
    /// Follow symlinks during discovery.
    pub follow_symlinks: bool,
    /// Glob patterns excluded from discovery.
    pub exclude_patterns: Vec<String>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            max_files: 10_000,
            allow_hidden_files: false,
            follow_symlinks: false,
            exclude_patterns: vec![
                "**/.git/**".into(),
                "**/node_modules/**".into(),
                "**/target/**".into(),
                "**/dist/**".into(),
                "**/build/**".into(),
                "**/.venv/**".into(),
                "**/__pycache__/**".into(),
            ],
        }
    }
}

/// Git-history cutoffs (§6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitSettings {
    /// Maximum commits to ingest.
    pub max_commits: usize,
    /// Minimum commits required before temporal analysis runs (§4.3).
    pub min_commits: usize,
    /// Commits touching more than this many files are treated as noisy
    /// bulk operations and excluded from co-change pair generation (§4.3).
    pub noisy_commit_file_threshold: usize,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            max_commits: 5_000,
            min_commits: 10,
            noisy_commit_file_threshold: 30,
        }
    }
}

/// Full settings surface (§6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// PageRank tuning.
    pub pagerank: PageRankSettings,
    /// Parallel workers for parsing (`None` = auto, `min(cores, 8)`).
    pub workers: Option<usize>,
    /// Resource limits applied during discovery.
    pub limits: ResourceLimits,
    /// Git-history cutoffs.
    pub git: GitSettings,
    /// Maximum findings returned (§4.6.6).
    pub max_findings: usize,
    /// Composite risk weights (§4.6.3).
    pub risk_weights: RiskWeights,
    /// Percentile floors (§4.6.2).
    pub signal_floors: SignalFloors,
    /// Per-pattern threshold overrides (§6).
    pub thresholds: ThresholdOverrides,
    /// Directory depth used to derive modules (§4.5).
    pub module_depth: usize,
    /// Minimum joint-commit count before a co-change pair is recorded.
    pub min_cochange_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pagerank: PageRankSettings::default(),
            workers: None,
            limits: ResourceLimits::default(),
            git: GitSettings::default(),
            max_findings: 50,
            risk_weights: RiskWeights::default(),
            signal_floors: SignalFloors::default(),
            thresholds: ThresholdOverrides::default(),
            module_depth: 1,
            min_cochange_count: 1,
        }
    }
}

impl Settings {
    /// Validate cross-field invariants, returning a `Config`/`Validation`
    /// error naming the offending field on failure (§6, §8 law 6).
    pub fn validate(&self) -> Result<()> {
        let weight_sum = self.risk_weights.sum();
        if (weight_sum - 1.0).abs() > 0.01 {
            return Err(CodeloomError::validation_field(
                format!("composite risk weights must sum to 1.0 +/- 0.01, got {weight_sum}"),
                "risk_weights",
            ));
        }

        if !(0.0..=1.0).contains(&self.pagerank.damping) {
            return Err(CodeloomError::validation_field(
                "pagerank damping must be in [0, 1]",
                "pagerank.damping",
            ));
        }

        if self.pagerank.iterations == 0 {
            return Err(CodeloomError::validation_field(
                "pagerank iterations must be positive",
                "pagerank.iterations",
            ));
        }

        if self.max_findings == 0 {
            return Err(CodeloomError::validation_field(
                "max_findings must be positive",
                "max_findings",
            ));
        }

        if self.module_depth == 0 {
            return Err(CodeloomError::validation_field(
                "module_depth must be positive",
                "module_depth",
            ));
        }

        for (pattern, overrides) in &self.thresholds {
            for (key, value) in overrides {
                if key.ends_with("_pctl") && !(0.0..=1.0).contains(value) {
                    return Err(CodeloomError::validation_field(
                        format!(
                            "percentile threshold override '{pattern}.{key}' must be in [0, 1], got {value}"
                        ),
                        format!("thresholds.{pattern}.{key}"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Resolve an overridden threshold for `pattern`/`key`, falling back to
    /// `default` when no override is configured.
    pub fn threshold(&self, pattern: &str, key: &str, default: f64) -> f64 {
        self.thresholds
            .get(pattern)
            .and_then(|overrides| overrides.get(key))
            .copied()
            .unwrap_or(default)
    }

    /// Resolve the effective worker count for bounded parallelism (§4.1,
    /// §5): `min(cores, 8)` unless overridden.
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, |n| n.get().min(8)))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn unbalanced_weights_fail_validation() {
        let mut settings = Settings::default();
        settings.risk_weights.pagerank = 0.9;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, CodeloomError::Validation { .. }));
    }

    #[test]
    fn out_of_range_percentile_override_fails_validation() {
        let mut settings = Settings::default();
        let mut overrides = HashMap::new();
        overrides.insert("high_risk_hub".to_string(), {
            let mut m = HashMap::new();
            m.insert("pagerank_pctl".to_string(), 1.5);
            m
        });
        settings.thresholds = overrides;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn threshold_override_takes_priority_over_default() {
        let mut settings = Settings::default();
        let mut inner = HashMap::new();
        inner.insert("god_file".to_string(), 0.95);
        settings.thresholds.insert("god_file".to_string(), inner);
        assert_eq!(settings.threshold("god_file", "god_file", 0.9), 0.95);
        assert_eq!(settings.threshold("other", "missing", 0.42), 0.42);
    }
}
