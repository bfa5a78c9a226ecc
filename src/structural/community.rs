//! Louvain-style community detection over the undirected import graph
//! (§4.2).
//!
//! Adapted from the shadow-island detector's `LouvainDetector`: greedy
//! single-level modularity optimization with a hash-based pseudo-random
//! node order, run until an iteration fails to improve modularity or
//! `max_iterations` is reached.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

const RESOLUTION: f64 = 1.0;
const MAX_ITERATIONS: usize = 100;
const MIN_IMPROVEMENT: f64 = 1e-6;

/// Final partition plus its modularity score.
pub struct CommunityResult {
    pub node_to_community: HashMap<NodeIndex, usize>,
    pub modularity: f64,
}

/// Detect communities in an undirected, edge-weighted graph via greedy
/// Louvain-style local modularity optimization.
pub fn detect_communities(graph: &UnGraph<String, f64>) -> CommunityResult {
    if graph.node_count() == 0 {
        return CommunityResult {
            node_to_community: HashMap::new(),
            modularity: 0.0,
        };
    }

    let mut node_to_community: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .enumerate()
        .map(|(i, idx)| (idx, i))
        .collect();

    let total_weight = total_weight(graph);
    if total_weight <= f64::EPSILON {
        return CommunityResult {
            node_to_community,
            modularity: 0.0,
        };
    }

    let mut current_modularity = modularity(graph, &node_to_community, total_weight);
    let mut improved = true;
    let mut iterations = 0;

    while improved && iterations < MAX_ITERATIONS {
        improved = false;
        let node_order = shuffled_node_order(graph, iterations);

        for node in node_order {
            let best = find_best_community(graph, node, &node_to_community, total_weight);
            if best != node_to_community[&node] {
                node_to_community.insert(node, best);
                improved = true;
            }
        }

        let new_modularity = modularity(graph, &node_to_community, total_weight);
        if new_modularity - current_modularity < MIN_IMPROVEMENT {
            improved = false;
        } else {
            current_modularity = new_modularity;
        }
        iterations += 1;
    }

    renumber_communities(&mut node_to_community);

    CommunityResult {
        node_to_community,
        modularity: current_modularity,
    }
}

fn shuffled_node_order(graph: &UnGraph<String, f64>, seed_salt: usize) -> Vec<NodeIndex> {
    let mut order: Vec<NodeIndex> = graph.node_indices().collect();
    let mut hasher = DefaultHasher::new();
    seed_salt.hash(&mut hasher);
    let seed = hasher.finish();

    for i in (1..order.len()).rev() {
        let mut hasher = DefaultHasher::new();
        (seed.wrapping_add(i as u64)).hash(&mut hasher);
        let j = (hasher.finish() as usize) % (i + 1);
        order.swap(i, j);
    }
    order
}

fn find_best_community(
    graph: &UnGraph<String, f64>,
    node: NodeIndex,
    node_to_community: &HashMap<NodeIndex, usize>,
    total_weight: f64,
) -> usize {
    let current_community = node_to_community[&node];
    let mut best_community = current_community;
    let mut best_gain =
        modularity_gain(graph, node, current_community, node_to_community, total_weight);

    let mut neighbor_communities = HashSet::new();
    for edge in graph.edges(node) {
        let neighbor = if edge.source() == node {
            edge.target()
        } else {
            edge.source()
        };
        if let Some(&community) = node_to_community.get(&neighbor) {
            neighbor_communities.insert(community);
        }
    }

    for candidate in neighbor_communities {
        if candidate == current_community {
            continue;
        }
        let gain = modularity_gain(graph, node, candidate, node_to_community, total_weight);
        if gain > best_gain {
            best_gain = gain;
            best_community = candidate;
        }
    }

    best_community
}

fn modularity_gain(
    graph: &UnGraph<String, f64>,
    node: NodeIndex,
    community: usize,
    node_to_community: &HashMap<NodeIndex, usize>,
    total_weight: f64,
) -> f64 {
    let node_degree = node_degree(graph, node);
    let mut edges_to_community = 0.0;
    let mut community_degree = 0.0;

    for edge in graph.edges(node) {
        let neighbor = if edge.source() == node {
            edge.target()
        } else {
            edge.source()
        };
        if let Some(&neighbor_community) = node_to_community.get(&neighbor) {
            if neighbor_community == community {
                edges_to_community += *edge.weight();
            }
            community_degree += node_degree(graph, neighbor);
        }
    }

    if node_to_community.get(&node) == Some(&community) {
        community_degree -= node_degree;
    }

    let expected_edges = (node_degree * community_degree) / (2.0 * total_weight);
    (edges_to_community - RESOLUTION * expected_edges) / total_weight
}

fn node_degree(graph: &UnGraph<String, f64>, node: NodeIndex) -> f64 {
    graph.edges(node).map(|e| *e.weight()).sum()
}

fn total_weight(graph: &UnGraph<String, f64>) -> f64 {
    graph.edge_weights().sum()
}

fn modularity(
    graph: &UnGraph<String, f64>,
    node_to_community: &HashMap<NodeIndex, usize>,
    total_weight: f64,
) -> f64 {
    if total_weight <= f64::EPSILON {
        return 0.0;
    }

    let mut by_community: HashMap<usize, Vec<NodeIndex>> = HashMap::new();
    for (&node, &community) in node_to_community {
        by_community.entry(community).or_default().push(node);
    }

    let mut modularity_sum = 0.0;
    for nodes in by_community.values() {
        let node_set: HashSet<NodeIndex> = nodes.iter().copied().collect();
        let mut internal = 0.0;
        let mut degree_sum = 0.0;
        for &node in nodes {
            degree_sum += node_degree(graph, node);
            for edge in graph.edges(node) {
                let neighbor = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                if node_set.contains(&neighbor) {
                    internal += *edge.weight();
                }
            }
        }
        // Each internal edge counted from both endpoints.
        internal /= 2.0;
        modularity_sum += internal / total_weight - (degree_sum / (2.0 * total_weight)).powi(2);
    }
    modularity_sum
}

fn renumber_communities(node_to_community: &mut HashMap<NodeIndex, usize>) {
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut next_id = 0;
    let mut nodes: Vec<NodeIndex> = node_to_community.keys().copied().collect();
    nodes.sort_by_key(|n| n.index());
    for node in nodes {
        let old = node_to_community[&node];
        let new_id = *remap.entry(old).or_insert_with(|| {
            let id = next_id;
            next_id += 1;
            id
        });
        node_to_community.insert(node, new_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_disjoint_cliques_form_two_communities() {
        let mut graph: UnGraph<String, f64> = UnGraph::new_undirected();
        let a = graph.add_node("a".into());
        let b = graph.add_node("b".into());
        let c = graph.add_node("c".into());
        let d = graph.add_node("d".into());
        graph.add_edge(a, b, 1.0);
        graph.add_edge(c, d, 1.0);

        let result = detect_communities(&graph);
        assert_eq!(result.node_to_community[&a], result.node_to_community[&b]);
        assert_eq!(result.node_to_community[&c], result.node_to_community[&d]);
        assert_ne!(result.node_to_community[&a], result.node_to_community[&c]);
    }

    #[test]
    fn empty_graph_has_zero_modularity() {
        let graph: UnGraph<String, f64> = UnGraph::new_undirected();
        let result = detect_communities(&graph);
        assert_eq!(result.modularity, 0.0);
    }
}
