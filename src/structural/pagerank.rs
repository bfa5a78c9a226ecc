//! PageRank over the import graph (§4.2).
//!
//! Standard damped power iteration: `damping=0.85`, `iterations<=20`,
//! `tolerance=1e-6`, normalized by the maximum score so the highest-ranked
//! file always scores `1.0`.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::settings::PageRankSettings;

/// Run PageRank over `graph`, returning a score per node index.
///
/// Dangling nodes (no outgoing edges) redistribute their mass uniformly, as
/// in the standard random-surfer model.
pub fn pagerank<N, E>(graph: &DiGraph<N, E>, settings: &PageRankSettings) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let indices: Vec<NodeIndex> = graph.node_indices().collect();
    let out_degree: Vec<usize> = indices
        .iter()
        .map(|&i| graph.neighbors_directed(i, Direction::Outgoing).count())
        .collect();

    let n_f = n as f64;
    let mut scores = vec![1.0 / n_f; n];
    let base = (1.0 - settings.damping) / n_f;

    for _ in 0..settings.iterations {
        let dangling_mass: f64 = indices
            .iter()
            .enumerate()
            .filter(|(idx, _)| out_degree[*idx] == 0)
            .map(|(idx, _)| scores[idx])
            .sum();
        let dangling_share = settings.damping * dangling_mass / n_f;

        let mut next = vec![base + dangling_share; n];
        for (idx, &node) in indices.iter().enumerate() {
            if out_degree[idx] == 0 {
                continue;
            }
            let contribution = settings.damping * scores[idx] / out_degree[idx] as f64;
            for target in graph.neighbors_directed(node, Direction::Outgoing) {
                let target_idx = target.index();
                next[target_idx] += contribution;
            }
        }

        let delta: f64 = scores
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;
        if delta < settings.tolerance {
            break;
        }
    }

    let max_score = scores.iter().cloned().fold(0.0_f64, f64::max);
    if max_score > f64::EPSILON {
        for score in &mut scores {
            *score /= max_score;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_node_outranks_leaves() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        graph.add_edge(a, c, ());
        graph.add_edge(b, c, ());

        let scores = pagerank(&graph, &PageRankSettings::default());
        assert!(scores[c.index()] > scores[a.index()]);
        assert!(scores[c.index()] > scores[b.index()]);
    }

    #[test]
    fn normalized_score_tops_out_at_one() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        graph.add_edge(a, b, ());
        let scores = pagerank(&graph, &PageRankSettings::default());
        assert!((scores.iter().cloned().fold(0.0, f64::max) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_graph_returns_empty_scores() {
        let graph: DiGraph<&str, ()> = DiGraph::new();
        assert!(pagerank(&graph, &PageRankSettings::default()).is_empty());
    }
}
