//! Betweenness centrality via Brandes' algorithm (§4.2).
//!
//! `petgraph` ships no betweenness implementation, so this is a direct,
//! unweighted-graph Brandes' algorithm: one BFS per source node accumulating
//! shortest-path dependency scores, normalized by the maximum observed
//! value (mirrors the PageRank normalization convention in this analyzer).

use std::collections::VecDeque;

use petgraph::graph::DiGraph;
use petgraph::Direction;

/// Approximate betweenness centrality for every node in `graph`, treating
/// edges as directed (the import relation is directional).
pub fn betweenness_centrality<N, E>(graph: &DiGraph<N, E>) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];
    if n == 0 {
        return centrality;
    }

    for source in graph.node_indices() {
        let s = source.index();
        let mut stack = Vec::new();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            stack.push(v.index());
            for w in graph.neighbors_directed(v, Direction::Outgoing) {
                let wi = w.index();
                if dist[wi] < 0 {
                    dist[wi] = dist[v.index()] + 1;
                    queue.push_back(w);
                }
                if dist[wi] == dist[v.index()] + 1 {
                    sigma[wi] += sigma[v.index()];
                    predecessors[wi].push(v.index());
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    let max = centrality.iter().cloned().fold(0.0_f64, f64::max);
    if max > f64::EPSILON {
        for c in &mut centrality {
            *c /= max;
        }
    }
    centrality
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_node_has_highest_betweenness() {
        // a -> bridge -> c, plus a direct a -> d with no further path.
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let a = graph.add_node("a");
        let bridge = graph.add_node("bridge");
        let c = graph.add_node("c");
        graph.add_edge(a, bridge, ());
        graph.add_edge(bridge, c, ());

        let scores = betweenness_centrality(&graph);
        assert!(scores[bridge.index()] >= scores[a.index()]);
        assert!(scores[bridge.index()] >= scores[c.index()]);
    }

    #[test]
    fn disconnected_nodes_score_zero() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        graph.add_node("a");
        graph.add_node("b");
        let scores = betweenness_centrality(&graph);
        assert_eq!(scores, vec![0.0, 0.0]);
    }
}
