//! Pattern Executor (§4.6.4-4.6.6) — evaluates the fixed registry of
//! declarative patterns against a fused [`SignalField`], then deduplicates
//! and ranks the resulting [`Finding`]s.
//!
//! Each pattern is its own small `Pattern` impl (one struct, one
//! `evaluate`), grouped by scope into submodules. The executor owns tier
//! gating, the hotspot-median gate, subsumption, and final ranking — no
//! individual pattern reimplements that bookkeeping.

mod codebase_patterns;
mod directory_patterns;
mod file_patterns;
mod module_pair_patterns;
mod module_patterns;
mod pair_patterns;
mod subsumption;

use std::collections::{HashMap, HashSet};

use crate::clones::ClonePair;
use crate::core::diagnostics::Diagnostics;
use crate::core::settings::Settings;
use crate::core::stats::{jaccard, median};
use crate::fusion::{ModuleAuthors, ModuleEdges};
use crate::model::{CoChangePair, Finding, FileSemantics, SignalField, Tier};

/// Everything a [`Pattern`] needs to evaluate itself against one analyzed
/// codebase. Built once per run by [`PatternExecutor::execute`].
pub struct PatternContext<'a> {
    pub field: &'a SignalField,
    pub settings: &'a Settings,
    pub co_change: &'a [CoChangePair],
    pub clones: &'a [ClonePair],
    pub module_authors: &'a ModuleAuthors,
    pub module_edges: &'a ModuleEdges,
    pub module_file_counts: &'a HashMap<String, usize>,
    /// Unordered file-level structural (import) edges, `(min_path, max_path)`.
    pub file_edges: &'a HashSet<(String, String)>,
    /// Raw per-file semantic concepts, kept alongside (not inside)
    /// `SignalField` since only `ACCIDENTAL_COUPLING` needs the full
    /// concept-topic sets rather than the scalar summaries on `FileSignals`.
    pub semantics: &'a HashMap<String, FileSemantics>,
    pub temporal_available: bool,
    pub hotspot_median: f64,
    /// Real repository commit count (`TemporalResult::total_commits`), `0`
    /// when temporal data is unavailable. Distinct from summing
    /// `total_changes` across files, which counts file-touches, not commits.
    pub total_commits: usize,
}

impl PatternContext<'_> {
    /// Jaccard similarity between two files' concept-topic sets, `0.0` when
    /// either file has no recorded concepts (treated as fully dissimilar).
    pub fn concept_jaccard(&self, a: &str, b: &str) -> f64 {
        let (Some(sa), Some(sb)) = (self.semantics.get(a), self.semantics.get(b)) else {
            return 0.0;
        };
        let topics_a: std::collections::HashSet<&str> = sa.concepts.iter().map(|c| c.topic.as_str()).collect();
        let topics_b: std::collections::HashSet<&str> = sb.concepts.iter().map(|c| c.topic.as_str()).collect();
        jaccard(&topics_a, &topics_b)
    }
}

impl PatternContext<'_> {
    /// Whether a file's `total_changes` clears the hotspot gate (§4.6.4
    /// step 3, FILE scope): files at or below the median are dormant and
    /// excluded from hotspot-filtered patterns.
    pub fn passes_hotspot_gate(&self, total_changes: Option<usize>) -> bool {
        total_changes.map(|c| c as f64 > self.hotspot_median).unwrap_or(false)
    }
}

/// A single declarative pattern (§4.6.4).
pub trait Pattern: Send + Sync {
    /// Canonical lowercase name, also used as the `Finding::pattern_name`
    /// and as the subsumption-table key.
    fn name(&self) -> &'static str;
    /// Minimum tier this pattern is allowed to fire under.
    fn tier_minimum(&self) -> Tier;
    /// True when this pattern needs the (optional) temporal layer; the
    /// executor skips it entirely, rather than per-file, when temporal
    /// data was unavailable (§4.6.4 step 2: "skip if any required slot is
    /// not available").
    fn requires_temporal(&self) -> bool {
        false
    }
    /// Evaluate this pattern against the whole codebase and return every
    /// finding it produces.
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding>;
}

/// Margin for a "high is bad" condition: `(value - threshold) / (1 - threshold)`,
/// clamped to `[0, 1]` (§4.6.4 confidence formula).
pub(crate) fn margin_high_bad(value: f64, threshold: f64) -> f64 {
    if (1.0 - threshold).abs() < f64::EPSILON {
        return if value >= threshold { 1.0 } else { 0.0 };
    }
    ((value - threshold) / (1.0 - threshold)).clamp(0.0, 1.0)
}

/// Margin for a "high is good" condition: `(threshold - value) / threshold`,
/// clamped to `[0, 1]`.
pub(crate) fn margin_high_good(value: f64, threshold: f64) -> f64 {
    if threshold.abs() < f64::EPSILON {
        return if value <= threshold { 1.0 } else { 0.0 };
    }
    ((threshold - value) / threshold).clamp(0.0, 1.0)
}

/// Normalizes an unordered file pair into the `(min, max)` form used as the
/// key in `PatternContext::file_edges`/co-change/clone lookups.
pub(crate) fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

pub(crate) fn average(margins: &[f64]) -> f64 {
    if margins.is_empty() {
        return 0.0;
    }
    margins.iter().sum::<f64>() / margins.len() as f64
}

/// Heuristic test-file match shared by patterns that need to exclude or
/// require test files; mirrors [`crate::model::FileSyntax::is_test_file`]
/// but operates on a bare path since patterns only see fused signals.
pub(crate) fn looks_like_test_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.contains("test") || lower.contains("spec")
}

fn registry() -> Vec<Box<dyn Pattern>> {
    let mut patterns: Vec<Box<dyn Pattern>> = Vec::new();
    file_patterns::register(&mut patterns);
    pair_patterns::register(&mut patterns);
    module_patterns::register(&mut patterns);
    module_pair_patterns::register(&mut patterns);
    codebase_patterns::register(&mut patterns);
    directory_patterns::register(&mut patterns);
    patterns
}

/// Runs the full pattern registry over a fused [`SignalField`] and returns
/// the deduplicated, ranked, capped finding list (§4.6.4-4.6.6).
#[derive(Default)]
pub struct PatternExecutor;

impl PatternExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &self,
        field: &SignalField,
        settings: &Settings,
        co_change: &[CoChangePair],
        clones: &[ClonePair],
        module_authors: &ModuleAuthors,
        module_edges: &ModuleEdges,
        module_file_counts: &HashMap<String, usize>,
        file_edges: &HashSet<(String, String)>,
        semantics: &HashMap<String, FileSemantics>,
        temporal_available: bool,
        total_commits: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Finding> {
        let hotspot_median = compute_hotspot_median(field);
        let ctx = PatternContext {
            field,
            settings,
            co_change,
            clones,
            module_authors,
            module_edges,
            module_file_counts,
            file_edges,
            semantics,
            temporal_available,
            hotspot_median,
            total_commits,
        };

        let mut findings = Vec::new();
        for pattern in registry() {
            if field.tier.rank() < pattern.tier_minimum().rank() {
                diagnostics.record_skipped_pattern(pattern.name(), "codebase tier below pattern minimum");
                continue;
            }
            if pattern.requires_temporal() && !temporal_available {
                diagnostics.record_skipped_pattern(pattern.name(), "temporal layer unavailable");
                continue;
            }
            findings.extend(pattern.evaluate(&ctx));
        }

        let findings = subsumption::apply(findings);
        rank_and_cap(findings, settings.max_findings)
    }
}

/// `hotspot_median` (§4.6.4 step 1): median `total_changes` over non-test
/// files with at least one recorded change. `0.0` when no file qualifies
/// (the hotspot gate then admits only files with `total_changes > 0`).
fn compute_hotspot_median(field: &SignalField) -> f64 {
    let values: Vec<f64> = field
        .per_file
        .values()
        .filter(|f| !looks_like_test_path(&f.path) && f.total_changes.unwrap_or(0) > 0)
        .map(|f| f.total_changes.unwrap_or(0) as f64)
        .collect();
    if values.is_empty() {
        0.0
    } else {
        median(&values)
    }
}

fn rank_and_cap(mut findings: Vec<Finding>, max_findings: usize) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        b.severity
            .partial_cmp(&a.severity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.stable_key().cmp(&b.stable_key()))
    });
    findings.truncate(max_findings);
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_high_bad_clamps_to_unit_interval() {
        assert_eq!(margin_high_bad(0.95, 0.90), 0.5);
        assert_eq!(margin_high_bad(0.5, 0.90), 0.0);
        assert_eq!(margin_high_bad(2.0, 0.90), 1.0);
    }

    #[test]
    fn margin_high_good_rewards_staying_under_threshold() {
        assert_eq!(margin_high_good(0.0, 1.5), 1.0);
        assert!((margin_high_good(0.75, 1.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rank_and_cap_orders_by_severity_then_stable_key() {
        use crate::model::{Effort, Evidence, Scope};
        let mk = |name: &str, sev: f64| Finding {
            pattern_name: name.to_string(),
            files: vec!["a.py".into()],
            scope: Scope::File,
            severity: sev,
            confidence: 1.0,
            evidence: Vec::<Evidence>::new(),
            suggestion: String::new(),
            effort: Effort::Low,
        };
        let findings = vec![mk("b", 0.5), mk("a", 0.9), mk("c", 0.9)];
        let ranked = rank_and_cap(findings, 50);
        assert_eq!(ranked[0].pattern_name, "a");
        assert_eq!(ranked[1].pattern_name, "c");
        assert_eq!(ranked[2].pattern_name, "b");
    }
}
