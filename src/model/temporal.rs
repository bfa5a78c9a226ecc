//! Temporal signal types produced by the Temporal Analyzer (§3, §4.3).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single commit as handed in by the external git-history collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit hash.
    pub hash: String,
    /// Unix timestamp of the commit.
    pub timestamp: i64,
    /// Author identifier (name or email).
    pub author: String,
    /// Commit message.
    pub message: String,
    /// Paths (relative to the codebase root) touched by this commit.
    pub files: Vec<String>,
}

/// Churn trajectory bucket, assigned via Otsu thresholding on slope/variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trajectory {
    /// Recently accelerating change rate.
    Spiking,
    /// Sustained high, volatile change rate.
    Churning,
    /// Decelerating toward stability.
    Stabilizing,
    /// Low, steady change rate.
    Stable,
    /// No recent changes.
    Dormant,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::Stable
    }
}

/// Per-file temporal signals (§3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChurnSeries {
    /// Total commits touching this file.
    pub total_changes: usize,
    /// Assigned trajectory bucket.
    pub trajectory: Trajectory,
    /// Linear-regression slope of commit counts across time windows.
    pub slope: f64,
    /// Coefficient of variation of per-window commit counts.
    pub cv: f64,
    /// `exp(entropy(author_commit_counts))`, floored at `1.0`.
    pub bus_factor: f64,
    /// Shannon entropy of the author commit-count distribution.
    pub author_entropy: f64,
    /// Share of commit messages matching a fix/bug/hotfix pattern.
    pub fix_ratio: f64,
    /// Share of commit messages matching a refactor/cleanup pattern.
    pub refactor_ratio: f64,
    /// Distinct commit authors, used for module-level author-distance
    /// (Conway's-law) comparisons.
    pub authors: BTreeSet<String>,
}

/// Co-change relationship between an unordered file pair (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoChangePair {
    /// First file path (lexicographically smaller of the pair).
    pub file_a: String,
    /// Second file path.
    pub file_b: String,
    /// Number of commits touching both files.
    pub cochange_count: usize,
    /// `P(b changed | a changed)`.
    pub confidence_a_to_b: f64,
    /// `P(a changed | b changed)`.
    pub confidence_b_to_a: f64,
    /// Ratio of observed joint-change frequency to that expected under
    /// independence (GLOSSARY: co-change lift).
    pub lift: f64,
}

impl CoChangePair {
    /// Maximum of the two directional confidences.
    pub fn max_confidence(&self) -> f64 {
        self.confidence_a_to_b.max(self.confidence_b_to_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trajectory_is_stable() {
        assert_eq!(Trajectory::default(), Trajectory::Stable);
    }

    #[test]
    fn max_confidence_picks_the_larger_direction() {
        let pair = CoChangePair {
            file_a: "a.py".into(),
            file_b: "b.py".into(),
            cochange_count: 3,
            confidence_a_to_b: 0.2,
            confidence_b_to_a: 0.9,
            lift: 2.0,
        };
        assert_eq!(pair.max_confidence(), 0.9);
    }
}
