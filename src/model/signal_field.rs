//! The unified [`SignalField`] produced by Signal Fusion (§3, §4.6).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::architecture::{LayerViolation, ModuleSummary};
use super::graph::GraphMetrics;
use super::semantic::FileRole;
use super::temporal::Trajectory;

/// Codebase-size tier gating percentile computation and pattern eligibility
/// (§4.6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Fewer than 15 files: no percentiles, absolute thresholds only.
    Absolute,
    /// 15-49 files: percentiles with flat priors.
    Bayesian,
    /// 50+ files: standard percentiles.
    Full,
}

impl Tier {
    /// Classify a file count into a tier (§4.6.1).
    pub fn from_file_count(file_count: usize) -> Self {
        if file_count < 15 {
            Tier::Absolute
        } else if file_count < 50 {
            Tier::Bayesian
        } else {
            Tier::Full
        }
    }

    /// Ordering used for `tier >= tier_minimum` gating: `Absolute < Bayesian
    /// < Full`.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Absolute => 0,
            Tier::Bayesian => 1,
            Tier::Full => 2,
        }
    }
}

/// Fully fused per-file signal record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSignals {
    /// Path relative to the codebase root.
    pub path: String,
    /// Directory this file lives in (module key, at module depth 1).
    pub directory: String,
    /// Module path this file was aggregated into.
    pub module: String,

    // --- graph ---
    /// Normalized PageRank.
    pub pagerank: f64,
    /// Approximate betweenness centrality.
    pub betweenness: f64,
    /// Incoming import edges.
    pub in_degree: usize,
    /// Outgoing import edges.
    pub out_degree: usize,
    /// Shortest path from an entry point; `-1` if unreachable.
    pub depth: i64,
    /// In-degree zero and not an entry point.
    pub is_orphan: bool,
    /// Louvain community id.
    pub community: usize,
    /// Transitive dependent count.
    pub blast_radius_size: usize,
    /// Unresolved import count.
    pub phantom_import_count: usize,
    /// Entry-point heuristic match.
    pub is_entry_point: bool,

    // --- temporal (absent when history was unavailable) ---
    /// Total commits touching this file, if temporal data is available.
    pub total_changes: Option<usize>,
    /// Churn trajectory bucket, if temporal data is available.
    pub trajectory: Option<Trajectory>,
    /// Churn slope, if temporal data is available.
    pub slope: Option<f64>,
    /// Coefficient of variation of churn, if temporal data is available.
    pub cv: Option<f64>,
    /// Bus factor, if temporal data is available.
    pub bus_factor: Option<f64>,
    /// Fix-commit share, if temporal data is available.
    pub fix_ratio: Option<f64>,
    /// Refactor-commit share, if temporal data is available.
    pub refactor_ratio: Option<f64>,

    // --- semantic ---
    /// Concept-distribution entropy.
    pub concept_entropy: f64,
    /// Semantic coherence (`1` = focused).
    pub semantic_coherence: f64,
    /// Naming drift (`1` = filename and content concepts fully disjoint).
    pub naming_drift: f64,
    /// Rule-based role classification.
    pub role: FileRole,
    /// Composite cognitive-load score.
    pub cognitive_load: f64,

    // --- syntax-derived ---
    /// Total line count.
    pub lines: usize,
    /// Total function count.
    pub function_count: usize,
    /// Mean per-function stub score.
    pub stub_ratio: f64,
    /// Gini coefficient of per-function body sizes.
    pub impl_gini: f64,

    // --- composite ---
    /// Weighted-sum composite risk before percentile scaling (§4.6.3).
    pub raw_risk: f64,
    /// Percentile-rank of `raw_risk` when `tier != Absolute`; else
    /// `raw_risk` unscaled.
    pub risk_score: f64,
    /// Health-Laplacian deviation from neighbor risk; `0` for orphans.
    pub delta_h: f64,

    /// Per-signal percentile ranks, only populated when `tier != Absolute`
    /// (invariant 3).
    pub percentiles: HashMap<String, f64>,
}

/// Aggregate signals for one directory (§3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DirectorySignals {
    /// Number of files directly aggregated under this directory.
    pub file_count: usize,
    /// Mean risk score of files in this directory.
    pub mean_risk: f64,
    /// Count of files whose `risk_score` percentile is >= 0.8.
    pub high_risk_files: usize,
    /// Share of directory commits contributed by its single hottest file.
    pub hotspot_share: f64,
    /// Mean cognitive load.
    pub mean_cognitive_load: f64,
    /// Mean naming drift.
    pub mean_naming_drift: f64,
    /// Number of distinct roles represented.
    pub role_diversity: usize,
    /// Total commits touching any file in the directory.
    pub total_changes: usize,
    /// Count of orphaned files.
    pub orphan_count: usize,
    /// Count of files with phantom imports.
    pub phantom_import_files: usize,
    /// Mean semantic coherence.
    pub mean_coherence: f64,
}

/// Codebase-wide signals (§3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalSignals {
    /// Louvain modularity of the final partition.
    pub modularity: f64,
    /// Second-smallest eigenvalue of the (undirected) graph Laplacian.
    pub fiedler_value: f64,
    /// Gap between the two smallest Laplacian eigenvalues.
    pub spectral_gap: f64,
    /// Count of SCCs with more than one node (cycles).
    pub cycle_count: usize,
    /// Gini coefficient of the PageRank distribution.
    pub centrality_gini: f64,
    /// Share of files that are orphans.
    pub orphan_ratio: f64,
    /// `1.0` minus the share of modules with a non-null "glue" alignment;
    /// high values indicate a flat, glue-deficient architecture.
    pub glue_deficit: f64,
    /// Overall weighted codebase health in `[0, 1]` (`1` = healthiest).
    pub codebase_health: f64,
    /// Architecture-specific health (layering + Martin-metric compliance).
    pub architecture_health: f64,
    /// Share of files reachable from an entry point within 2 hops, as a
    /// rough proxy for how well "wired together" the codebase is.
    pub wiring_score: f64,
    /// Distinct commit authors across the analyzed history.
    pub team_size: usize,
    /// True when the module DAG has a clear multi-layer topology.
    pub has_layering: bool,
    /// Maximum topological layer depth observed.
    pub max_depth: usize,
}

/// The unified result of Signal Fusion (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalField {
    /// Per-file fused signals, keyed by relative path.
    pub per_file: HashMap<String, FileSignals>,
    /// Per-directory aggregates, keyed by directory path.
    pub per_directory: HashMap<String, DirectorySignals>,
    /// Per-module Martin/architecture signals, keyed by module path.
    pub per_module: HashMap<String, ModuleSummary>,
    /// Codebase-wide signals.
    pub global_signals: GlobalSignals,
    /// Detected architectural layer violations.
    pub layer_violations: Vec<LayerViolation>,
    /// Tier this field was computed under.
    pub tier: Tier,
}

impl SignalField {
    /// Look up a file's signals, if present.
    pub fn file(&self, path: &str) -> Option<&FileSignals> {
        self.per_file.get(path)
    }
}
