//! Structural Analyzer (§4.2) — the import graph and everything derived
//! from it: PageRank, betweenness, blast radius, entry-point depth, orphan
//! detection, cycle/SCC counting, Louvain communities, and an approximate
//! algebraic connectivity.

pub mod centrality;
pub mod community;
pub mod import_graph;
pub mod pagerank;
pub mod reachability;
pub mod spectral;

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::core::settings::Settings;
use crate::core::stats::gini;
use crate::model::{FileSyntax, GraphMetrics};

use import_graph::ImportGraph;

/// Codebase-wide graph signals produced alongside the per-file metrics,
/// consumed by [`crate::fusion`] when assembling [`crate::model::GlobalSignals`].
#[derive(Debug, Clone, Default)]
pub struct GlobalGraphSignals {
    pub modularity: f64,
    pub fiedler_value: f64,
    pub spectral_gap: f64,
    pub cycle_count: usize,
    pub centrality_gini: f64,
    pub orphan_ratio: f64,
    pub wiring_score: f64,
}

/// Full structural analysis result.
pub struct StructuralResult {
    pub per_file: HashMap<String, GraphMetrics>,
    pub global: GlobalGraphSignals,
    /// File-level import edges `(source_path, target_path)`, handed to the
    /// Architecture Analyzer to aggregate into module-level coupling.
    pub edges: Vec<(String, String)>,
}

/// Computes the structural signal layer from parsed syntax (§4.2).
#[derive(Debug, Default)]
pub struct StructuralAnalyzer;

impl StructuralAnalyzer {
    pub fn analyze(&self, syntax: &HashMap<String, FileSyntax>, settings: &Settings) -> StructuralResult {
        let import_graph = ImportGraph::build(syntax);
        let graph = &import_graph.graph;
        let n = graph.node_count();

        if n == 0 {
            return StructuralResult {
                per_file: HashMap::new(),
                global: GlobalGraphSignals::default(),
                edges: Vec::new(),
            };
        }

        let pagerank_scores = pagerank::pagerank(graph, &settings.pagerank);
        let betweenness_scores = centrality::betweenness_centrality(graph);

        let entry_points: Vec<NodeIndex> = syntax
            .iter()
            .filter(|(_, f)| f.has_main_guard)
            .filter_map(|(path, _)| import_graph.index_of.get(path).copied())
            .collect();
        let depth = reachability::depth_from_entry_points(graph, &entry_points);
        let wiring = reachability::wiring_score(graph, &entry_points, &depth);

        let sccs = kosaraju_scc(graph);
        let cycle_count = sccs.iter().filter(|scc| scc.len() > 1).count();

        let undirected = to_undirected(graph);
        let community_result = community::detect_communities(&undirected);
        let (fiedler_value, spectral_gap) = spectral::fiedler_and_gap(&undirected);

        let mut centrality_values = pagerank_scores.clone();
        let centrality_gini = gini(&mut centrality_values);

        let mut per_file = HashMap::with_capacity(n);
        let mut orphan_count = 0;
        for (path, &idx) in &import_graph.index_of {
            let i = idx.index();
            let in_degree = graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .count();
            let out_degree = graph
                .neighbors_directed(idx, petgraph::Direction::Outgoing)
                .count();
            let is_entry_point = entry_points.contains(&idx);
            let is_orphan = in_degree == 0 && !is_entry_point;
            if is_orphan {
                orphan_count += 1;
            }

            per_file.insert(
                path.clone(),
                GraphMetrics {
                    pagerank: pagerank_scores.get(i).copied().unwrap_or(0.0),
                    betweenness: betweenness_scores.get(i).copied().unwrap_or(0.0),
                    in_degree,
                    out_degree,
                    depth: depth.get(i).copied().unwrap_or(-1),
                    is_orphan,
                    community: community_result
                        .node_to_community
                        .get(&idx)
                        .copied()
                        .unwrap_or(0),
                    blast_radius_size: reachability::blast_radius(graph, idx),
                    phantom_import_count: import_graph.phantom_counts.get(path).copied().unwrap_or(0),
                    is_entry_point,
                },
            );
        }

        let global = GlobalGraphSignals {
            modularity: community_result.modularity,
            fiedler_value,
            spectral_gap,
            cycle_count,
            centrality_gini,
            orphan_ratio: orphan_count as f64 / n as f64,
            wiring_score: wiring,
        };

        let edges = graph
            .edge_indices()
            .filter_map(|e| graph.edge_endpoints(e))
            .map(|(a, b)| (graph[a].clone(), graph[b].clone()))
            .collect();

        StructuralResult {
            per_file,
            global,
            edges,
        }
    }
}

/// Collapse the directed import graph into an undirected, edge-weighted
/// graph (a shared import relation in either direction counts as one
/// connection) for community detection and spectral analysis.
fn to_undirected(graph: &petgraph::graph::DiGraph<String, ()>) -> UnGraph<String, f64> {
    let mut undirected: UnGraph<String, f64> = UnGraph::new_undirected();
    let mut remap = HashMap::with_capacity(graph.node_count());
    for idx in graph.node_indices() {
        let weight = graph[idx].clone();
        remap.insert(idx, undirected.add_node(weight));
    }

    let mut seen_pairs: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> = HashMap::new();
    for edge in graph.edge_indices() {
        let (a, b) = graph.edge_endpoints(edge).unwrap();
        let (ua, ub) = (remap[&a], remap[&b]);
        let key = if ua.index() < ub.index() { (ua, ub) } else { (ub, ua) };
        if let Some(&existing) = seen_pairs.get(&key) {
            if let Some(weight) = undirected.edge_weight_mut(existing) {
                *weight += 1.0;
            }
        } else {
            let new_edge = undirected.add_edge(key.0, key.1, 1.0);
            seen_pairs.insert(key, new_edge);
        }
    }
    undirected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImportDecl;

    fn file(path: &str, imports: Vec<&str>, has_main_guard: bool) -> FileSyntax {
        FileSyntax {
            path: path.to_string(),
            language: "py".to_string(),
            mtime: None,
            lines: 10,
            tokens: 10,
            complexity: 1,
            functions: vec![],
            classes: vec![],
            imports: imports
                .into_iter()
                .map(|s| ImportDecl {
                    source: s.to_string(),
                    names: vec![],
                    resolved_path: None,
                })
                .collect(),
            has_main_guard,
            used_fallback_parser: false,
        }
    }

    #[test]
    fn orphan_file_has_zero_in_degree_and_is_flagged() {
        let mut syntax = HashMap::new();
        syntax.insert("entry.py".to_string(), file("entry.py", vec!["hub"], true));
        syntax.insert("hub.py".to_string(), file("hub", vec![], false));
        syntax.insert("orphan.py".to_string(), file("orphan.py", vec![], false));

        let result = StructuralAnalyzer.analyze(&syntax, &Settings::default());
        let orphan = &result.per_file["orphan.py"];
        assert!(orphan.is_orphan);
        assert_eq!(orphan.in_degree, 0);

        let hub = &result.per_file["hub.py"];
        assert!(!hub.is_orphan);
        assert_eq!(hub.in_degree, 1);
    }

    #[test]
    fn entry_point_is_never_flagged_as_orphan() {
        let mut syntax = HashMap::new();
        syntax.insert("main.py".to_string(), file("main.py", vec![], true));
        let result = StructuralAnalyzer.analyze(&syntax, &Settings::default());
        assert!(!result.per_file["main.py"].is_orphan);
    }

    #[test]
    fn empty_codebase_yields_empty_result() {
        let result = StructuralAnalyzer.analyze(&HashMap::new(), &Settings::default());
        assert!(result.per_file.is_empty());
        assert_eq!(result.global.orphan_ratio, 0.0);
    }
}
