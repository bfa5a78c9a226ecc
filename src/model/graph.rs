//! Structural signal types produced by the Structural Analyzer (§3, §4.2).

use serde::{Deserialize, Serialize};

/// Per-file graph-centrality metrics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphMetrics {
    /// PageRank score, normalized by dividing by the maximum score.
    pub pagerank: f64,
    /// Approximate betweenness centrality.
    pub betweenness: f64,
    /// Number of files importing this file.
    pub in_degree: usize,
    /// Number of files this file imports.
    pub out_degree: usize,
    /// Shortest path length from any entry-point file; `-1` if unreachable.
    pub depth: i64,
    /// `in_degree == 0` and this file is not an entry point.
    pub is_orphan: bool,
    /// Louvain community partition id.
    pub community: usize,
    /// Count of transitive dependents (files that would be affected by a
    /// change to this file), via reverse-graph DFS.
    pub blast_radius_size: usize,
    /// Imports that did not resolve to a file in the codebase.
    pub phantom_import_count: usize,
    /// True when this file is an entry point (main-guard heuristic).
    pub is_entry_point: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zeroed() {
        let metrics = GraphMetrics::default();
        assert_eq!(metrics.pagerank, 0.0);
        assert_eq!(metrics.depth, 0);
        assert!(!metrics.is_orphan);
    }
}
