//! Self-diagnostic reporting (§10.2, §11 item 1).
//!
//! Grounded in `insights/diagnostics.py` from the original implementation:
//! a side-channel report of analysis-quality issues, separate from the
//! findings themselves, so a caller can surface "this run's temporal
//! signals are unreliable" without it becoming a finding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One detected analysis-quality issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticIssue {
    /// Category: `"slot"`, `"pattern"`, `"data"`, `"signal"`.
    pub category: String,
    /// `"info"` or `"warning"`.
    pub severity: String,
    /// Short human-readable message.
    pub message: String,
}

impl DiagnosticIssue {
    fn warning(category: &str, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            severity: "warning".into(),
            message: message.into(),
        }
    }

    fn info(category: &str, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            severity: "info".into(),
            message: message.into(),
        }
    }
}

/// Diagnostics accumulated across a single `analyze()` run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Quality issues detected during this run.
    pub issues: Vec<DiagnosticIssue>,
    /// Blackboard slots that ended up unavailable, with the producer name
    /// and reason (empty reason means the slot was simply never filled).
    pub missing_slots: Vec<(String, String)>,
    /// Patterns skipped, with a reason (`"missing requirement"` or
    /// `"tier gate"`).
    pub skipped_patterns: Vec<(String, String)>,
    /// Share of commits excluded from co-change pair generation as noisy
    /// bulk operations (§4.3).
    pub noisy_commit_rate: f64,
    /// Share of files parsed by the regex fallback rather than the
    /// structural parser (§4.1).
    pub fallback_parse_rate: f64,
    /// Signals observed to be constant across every file (zero
    /// information gain), keyed by signal name to the constant value.
    pub zero_variance_signals: HashMap<String, f64>,
}

impl Diagnostics {
    /// Record a slot that ended up unavailable.
    pub fn record_missing_slot(&mut self, slot_name: &str, reason: &str) {
        self.missing_slots
            .push((slot_name.to_string(), reason.to_string()));
        self.issues.push(DiagnosticIssue::info(
            "slot",
            format!("slot '{slot_name}' unavailable: {reason}"),
        ));
    }

    /// Record a pattern skipped for `reason`.
    pub fn record_skipped_pattern(&mut self, pattern_name: &str, reason: &str) {
        self.skipped_patterns
            .push((pattern_name.to_string(), reason.to_string()));
    }

    /// Record the fallback-parser rate and warn if it is unexpectedly high
    /// (§4.1: warn when >20% of files fell back and a structural parser
    /// was available).
    pub fn record_fallback_rate(&mut self, rate: f64, structural_parser_available: bool) {
        self.fallback_parse_rate = rate;
        if rate > 0.2 && structural_parser_available {
            self.issues.push(DiagnosticIssue::warning(
                "data",
                format!("{:.0}% of files fell back to the regex parser", rate * 100.0),
            ));
        }
    }

    /// Record the noisy bulk-commit rate.
    pub fn record_noisy_commit_rate(&mut self, rate: f64) {
        self.noisy_commit_rate = rate;
        if rate > 0.1 {
            self.issues.push(DiagnosticIssue::info(
                "data",
                format!(
                    "{:.0}% of commits were excluded from co-change analysis as bulk operations",
                    rate * 100.0
                ),
            ));
        }
    }

    /// Check a named per-file signal distribution for zero variance
    /// (constant across every file) and record it if so.
    pub fn check_signal_variance(&mut self, signal_name: &str, values: &[f64]) {
        if values.len() < 2 {
            return;
        }
        let first = values[0];
        if values.iter().all(|v| (v - first).abs() <= f64::EPSILON) {
            self.zero_variance_signals
                .insert(signal_name.to_string(), first);
            self.issues.push(DiagnosticIssue::info(
                "signal",
                format!("signal '{signal_name}' is constant ({first}) across all files"),
            ));
        }
    }

    /// True if any warning-level issue was recorded.
    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == "warning")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_signal_is_flagged() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.check_signal_variance("pagerank", &[0.1, 0.1, 0.1]);
        assert_eq!(diagnostics.zero_variance_signals.get("pagerank"), Some(&0.1));
    }

    #[test]
    fn varying_signal_is_not_flagged() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.check_signal_variance("pagerank", &[0.1, 0.2, 0.3]);
        assert!(diagnostics.zero_variance_signals.is_empty());
    }

    #[test]
    fn high_fallback_rate_warns_when_structural_parser_available() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_fallback_rate(0.5, true);
        assert!(diagnostics.has_warnings());
    }
}
