//! Blast radius, entry-point BFS depth, orphan detection, and wiring score
//! (§4.2).

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// Count of nodes reachable via the reverse graph from `start` (i.e. every
/// file that transitively depends on `start`, excluding `start` itself).
pub fn blast_radius<N, E>(graph: &DiGraph<N, E>, start: NodeIndex) -> usize {
    let mut visited = vec![false; graph.node_count()];
    visited[start.index()] = true;
    let mut queue = VecDeque::new();
    queue.push_back(start);
    let mut count = 0;
    while let Some(node) = queue.pop_front() {
        for dependent in graph.neighbors_directed(node, Direction::Incoming) {
            if !visited[dependent.index()] {
                visited[dependent.index()] = true;
                count += 1;
                queue.push_back(dependent);
            }
        }
    }
    count
}

/// Multi-source BFS depth from every entry point, forward along import
/// edges. Unreached nodes get depth `-1`.
pub fn depth_from_entry_points<N, E>(
    graph: &DiGraph<N, E>,
    entry_points: &[NodeIndex],
) -> Vec<i64> {
    let mut depth = vec![-1_i64; graph.node_count()];
    let mut queue = VecDeque::new();
    for &entry in entry_points {
        depth[entry.index()] = 0;
        queue.push_back(entry);
    }
    while let Some(node) = queue.pop_front() {
        let d = depth[node.index()];
        for neighbor in graph.neighbors_directed(node, Direction::Outgoing) {
            if depth[neighbor.index()] < 0 {
                depth[neighbor.index()] = d + 1;
                queue.push_back(neighbor);
            }
        }
    }
    depth
}

/// Share of non-entry-point files reachable from an entry point within two
/// hops — a coarse proxy for how well "wired together" the codebase is,
/// feeding [`crate::model::GlobalSignals::wiring_score`].
pub fn wiring_score<N, E>(
    graph: &DiGraph<N, E>,
    entry_points: &[NodeIndex],
    depth: &[i64],
) -> f64 {
    let total = graph.node_count().saturating_sub(entry_points.len());
    if total == 0 {
        return 1.0;
    }
    let wired = depth
        .iter()
        .enumerate()
        .filter(|(idx, d)| **d >= 0 && **d <= 2 && !entry_points.iter().any(|e| e.index() == *idx))
        .count();
    wired as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blast_radius_counts_transitive_dependents() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let core = graph.add_node("core");
        let mid = graph.add_node("mid");
        let leaf = graph.add_node("leaf");
        graph.add_edge(mid, core, ());
        graph.add_edge(leaf, mid, ());

        assert_eq!(blast_radius(&graph, core), 2);
        assert_eq!(blast_radius(&graph, leaf), 0);
    }

    #[test]
    fn depth_increases_along_import_chain() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let entry = graph.add_node("entry");
        let mid = graph.add_node("mid");
        let leaf = graph.add_node("leaf");
        graph.add_edge(entry, mid, ());
        graph.add_edge(mid, leaf, ());

        let depth = depth_from_entry_points(&graph, &[entry]);
        assert_eq!(depth[entry.index()], 0);
        assert_eq!(depth[mid.index()], 1);
        assert_eq!(depth[leaf.index()], 2);
    }

    #[test]
    fn unreachable_node_has_negative_depth() {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let entry = graph.add_node("entry");
        let isolated = graph.add_node("isolated");
        let depth = depth_from_entry_points(&graph, &[entry]);
        assert_eq!(depth[isolated.index()], -1);
    }
}
