//! Architecture Analyzer (§4.5) — Martin package metrics, topological
//! layering, and layer-violation detection over directory-derived modules.

use std::collections::{HashMap, HashSet};

use crate::core::hierarchy::module_key;
use crate::model::{
    FileRole, FileSemantics, FileSyntax, GraphMetrics, LayerViolation, LayerViolationKind,
    ModuleRole, ModuleSummary,
};

/// Full architecture analysis result.
pub struct ArchitectureResult {
    pub per_module: HashMap<String, ModuleSummary>,
    pub layer_violations: Vec<LayerViolation>,
    pub has_layering: bool,
    pub max_depth: usize,
}

/// Computes Martin metrics and layering for directory-derived modules
/// (§4.5).
#[derive(Debug, Default)]
pub struct ArchitectureAnalyzer;

impl ArchitectureAnalyzer {
    pub fn analyze(
        &self,
        syntax: &HashMap<String, FileSyntax>,
        semantics: &HashMap<String, FileSemantics>,
        graph_metrics: &HashMap<String, GraphMetrics>,
        edges: &[(String, String)],
        module_depth: usize,
    ) -> ArchitectureResult {
        let module_of: HashMap<String, String> = syntax
            .keys()
            .map(|path| (path.clone(), module_key(path, module_depth)))
            .collect();

        let mut files_by_module: HashMap<String, Vec<String>> = HashMap::new();
        for (path, module) in &module_of {
            files_by_module.entry(module.clone()).or_default().push(path.clone());
        }

        let module_edges = aggregate_module_edges(edges, &module_of);
        let mut per_module = HashMap::with_capacity(files_by_module.len());

        for (module, files) in &files_by_module {
            per_module.insert(
                module.clone(),
                build_module_summary(module, files, syntax, semantics, graph_metrics, &module_edges),
            );
        }

        let (layers, layer_violations) = compute_layers(&files_by_module, &module_edges);
        for (module, layer) in &layers {
            if let Some(summary) = per_module.get_mut(module) {
                summary.layer = *layer;
            }
        }

        let distinct_layers: HashSet<usize> = layers.values().filter_map(|l| *l).collect();
        let max_depth = distinct_layers.iter().copied().max().unwrap_or(0);
        let cyclic_modules = layers.values().filter(|l| l.is_none()).count();
        let has_layering = distinct_layers.len() >= 2
            && (cyclic_modules as f64) / (files_by_module.len().max(1) as f64) <= 0.5;

        ArchitectureResult {
            per_module,
            layer_violations,
            has_layering,
            max_depth,
        }
    }
}

/// Aggregate file-level edges into module-level edge counts, dropping
/// self-edges (a file importing another file in its own module).
fn aggregate_module_edges(
    edges: &[(String, String)],
    module_of: &HashMap<String, String>,
) -> HashMap<(String, String), usize> {
    let mut counts = HashMap::new();
    for (from, to) in edges {
        let (Some(from_mod), Some(to_mod)) = (module_of.get(from), module_of.get(to)) else {
            continue;
        };
        if from_mod == to_mod {
            continue;
        }
        *counts.entry((from_mod.clone(), to_mod.clone())).or_insert(0) += 1;
    }
    counts
}

fn build_module_summary(
    module: &str,
    files: &[String],
    syntax: &HashMap<String, FileSyntax>,
    semantics: &HashMap<String, FileSemantics>,
    graph_metrics: &HashMap<String, GraphMetrics>,
    module_edges: &HashMap<(String, String), usize>,
) -> ModuleSummary {
    let file_count = files.len();

    let efferent_coupling: usize = module_edges
        .iter()
        .filter(|((from, _), _)| from == module)
        .map(|(_, count)| count)
        .sum();
    let afferent_coupling: usize = module_edges
        .iter()
        .filter(|((_, to), _)| to == module)
        .map(|(_, count)| count)
        .sum();

    let instability = if afferent_coupling + efferent_coupling == 0 {
        None
    } else {
        Some(efferent_coupling as f64 / (afferent_coupling + efferent_coupling) as f64)
    };

    let (abstract_classes, total_classes) = files
        .iter()
        .filter_map(|f| syntax.get(f))
        .flat_map(|f| &f.classes)
        .fold((0usize, 0usize), |(abs, total), class| {
            (abs + class.is_abstract as usize, total + 1)
        });
    let abstractness = if total_classes == 0 {
        0.0
    } else {
        abstract_classes as f64 / total_classes as f64
    };

    let main_sequence_distance = instability.map(|i| (abstractness + i - 1.0).abs());

    let communities: Vec<usize> = files
        .iter()
        .filter_map(|f| graph_metrics.get(f))
        .map(|g| g.community)
        .collect();
    let (cohesion, boundary_alignment) = community_alignment(&communities);

    let dominant_role = dominant_module_role(files, semantics);

    ModuleSummary {
        file_count,
        cohesion,
        coupling: if afferent_coupling + efferent_coupling == 0 {
            0.0
        } else {
            efferent_coupling as f64 / (afferent_coupling + efferent_coupling) as f64
        },
        afferent_coupling,
        efferent_coupling,
        instability,
        abstractness,
        main_sequence_distance,
        dominant_role,
        boundary_alignment,
        layer: None,
    }
}

/// `(cohesion, boundary_alignment)`: both derived from how concentrated a
/// module's files are within a single Louvain community. Distinguished so
/// a module can be internally cohesive in practice while still splitting a
/// community across a directory boundary, or vice versa.
fn community_alignment(communities: &[usize]) -> (f64, f64) {
    if communities.is_empty() {
        return (0.0, 0.0);
    }
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &c in communities {
        *counts.entry(c).or_insert(0) += 1;
    }
    let dominant_count = counts.values().copied().max().unwrap_or(0);
    let alignment = dominant_count as f64 / communities.len() as f64;
    (alignment, alignment)
}

fn dominant_module_role(files: &[String], semantics: &HashMap<String, FileSemantics>) -> ModuleRole {
    let mut counts: HashMap<FileRole, usize> = HashMap::new();
    for file in files {
        if let Some(sem) = semantics.get(file) {
            *counts.entry(sem.role).or_insert(0) += 1;
        }
    }
    let total = files.len().max(1);
    let dominant = counts.iter().max_by_key(|(_, count)| **count);
    match dominant {
        Some((FileRole::Entry, count)) if *count * 2 > total => ModuleRole::Entry,
        Some((FileRole::Service, count)) if *count * 2 > total => ModuleRole::Service,
        Some((FileRole::Model, count)) if *count * 2 > total => ModuleRole::Model,
        _ => ModuleRole::Mixed,
    }
}

/// Topological layering via longest-path-from-leaves over the module
/// dependency DAG, plus layer-violation detection (§4.5).
///
/// Modules inside a dependency cycle (a module-level SCC of size > 1)
/// cannot be given a consistent layer and get `None`; every edge inside
/// such a cycle is reported as a [`LayerViolationKind::Backward`]
/// violation. Edges that skip more than one layer are reported as
/// [`LayerViolationKind::Skip`].
fn compute_layers(
    files_by_module: &HashMap<String, Vec<String>>,
    module_edges: &HashMap<(String, String), usize>,
) -> (HashMap<String, Option<usize>>, Vec<LayerViolation>) {
    let modules: Vec<String> = files_by_module.keys().cloned().collect();
    let sccs = cyclic_sccs(&modules, module_edges);
    let cyclic: HashSet<String> = sccs.iter().flatten().cloned().collect();

    let mut layer: HashMap<String, Option<usize>> = HashMap::new();
    for module in &modules {
        if cyclic.contains(module) {
            layer.insert(module.clone(), None);
        }
    }

    // Longest-path layering, memoized, over the acyclic remainder.
    fn resolve(
        module: &str,
        module_edges: &HashMap<(String, String), usize>,
        cyclic: &HashSet<String>,
        layer: &mut HashMap<String, Option<usize>>,
        visiting: &mut HashSet<String>,
    ) -> Option<usize> {
        if let Some(cached) = layer.get(module) {
            return *cached;
        }
        if !visiting.insert(module.to_string()) {
            return None;
        }
        let dependencies: Vec<&String> = module_edges
            .keys()
            .filter(|(from, _)| from == module)
            .map(|(_, to)| to)
            .filter(|to| *to != module)
            .collect();

        let result = if dependencies.is_empty() {
            Some(0)
        } else {
            let mut max_layer = None;
            for dep in dependencies {
                if cyclic.contains(dep) {
                    continue;
                }
                if let Some(dep_layer) = resolve(dep, module_edges, cyclic, layer, visiting) {
                    max_layer = Some(max_layer.unwrap_or(0).max(dep_layer + 1));
                }
            }
            Some(max_layer.unwrap_or(0))
        };

        visiting.remove(module);
        layer.insert(module.to_string(), result);
        result
    }

    let mut visiting = HashSet::new();
    for module in &modules {
        if !cyclic.contains(module) {
            resolve(module, module_edges, &cyclic, &mut layer, &mut visiting);
        }
    }

    // One Backward violation per cyclic SCC, not per edge inside it: the
    // whole SCC is a single architectural problem, so pick one
    // representative back-edge (the lexicographically-least pair, for
    // determinism) rather than reporting every edge in the cycle.
    let mut violations = Vec::new();
    for scc in &sccs {
        let mut scc_edges: Vec<(&String, &String, usize)> = module_edges
            .iter()
            .filter(|((from, to), _)| from != to && scc.contains(from) && scc.contains(to))
            .map(|((from, to), &count)| (from, to, count))
            .collect();
        scc_edges.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));
        if let Some((from, to, edge_count)) = scc_edges.into_iter().next() {
            violations.push(LayerViolation {
                source_module: from.clone(),
                target_module: to.clone(),
                source_layer: 0,
                target_layer: 0,
                violation_type: LayerViolationKind::Backward,
                edge_count,
            });
        }
    }

    for ((from, to), &edge_count) in module_edges {
        if from == to || cyclic.contains(from) || cyclic.contains(to) {
            continue;
        }
        let from_layer = layer.get(from).copied().flatten();
        let to_layer = layer.get(to).copied().flatten();
        if let (Some(fl), Some(tl)) = (from_layer, to_layer) {
            if fl.saturating_sub(tl) > 1 {
                violations.push(LayerViolation {
                    source_module: from.clone(),
                    target_module: to.clone(),
                    source_layer: fl,
                    target_layer: tl,
                    violation_type: LayerViolationKind::Skip,
                    edge_count,
                });
            }
        }
    }

    (layer, violations)
}

/// Strongly connected components of size > 1 in the module dependency
/// graph, via mutual-reachability grouping (module counts are small
/// relative to file counts, so an O(m^2) check over module pairs is cheap
/// in practice). Each returned set is one cycle's full membership, used to
/// collapse that cycle's edges into a single [`LayerViolation`] rather than
/// one per edge.
fn cyclic_sccs(
    modules: &[String],
    module_edges: &HashMap<(String, String), usize>,
) -> Vec<HashSet<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in module_edges.keys() {
        adjacency.entry(from.as_str()).or_default().push(to.as_str());
    }

    let reachable = |start: &str| -> HashSet<&str> {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for &next in adjacency.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        visited
    };

    let mut assigned: HashSet<String> = HashSet::new();
    let mut sccs = Vec::new();
    for module in modules {
        if assigned.contains(module.as_str()) {
            continue;
        }
        let forward = reachable(module);
        let members: HashSet<String> = std::iter::once(module.clone())
            .chain(
                forward
                    .iter()
                    .filter(|&&m| m != module.as_str() && reachable(m).contains(module.as_str()))
                    .map(|&m| m.to_string()),
            )
            .collect();
        if members.len() > 1 {
            assigned.extend(members.iter().cloned());
            sccs.push(members);
        }
    }
    sccs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileSemantics;

    fn syntax_file(path: &str) -> FileSyntax {
        FileSyntax {
            path: path.to_string(),
            language: "py".to_string(),
            mtime: None,
            lines: 1,
            tokens: 1,
            complexity: 1,
            functions: vec![],
            classes: vec![],
            imports: vec![],
            has_main_guard: false,
            used_fallback_parser: false,
        }
    }

    #[test]
    fn leaf_module_gets_layer_zero() {
        let mut syntax = HashMap::new();
        syntax.insert("utils/a.py".to_string(), syntax_file("utils/a.py"));
        syntax.insert("services/b.py".to_string(), syntax_file("services/b.py"));
        let semantics: HashMap<String, FileSemantics> = HashMap::new();
        let graph_metrics = HashMap::new();
        let edges = vec![("services/b.py".to_string(), "utils/a.py".to_string())];

        let result = ArchitectureAnalyzer.analyze(&syntax, &semantics, &graph_metrics, &edges, 1);
        assert_eq!(result.per_module["utils"].layer, Some(0));
        assert_eq!(result.per_module["services"].layer, Some(1));
        assert_eq!(result.max_depth, 1);
    }

    #[test]
    fn mutual_module_dependency_is_flagged_backward() {
        let mut syntax = HashMap::new();
        syntax.insert("a/x.py".to_string(), syntax_file("a/x.py"));
        syntax.insert("b/y.py".to_string(), syntax_file("b/y.py"));
        let semantics: HashMap<String, FileSemantics> = HashMap::new();
        let graph_metrics = HashMap::new();
        let edges = vec![
            ("a/x.py".to_string(), "b/y.py".to_string()),
            ("b/y.py".to_string(), "a/x.py".to_string()),
        ];

        let result = ArchitectureAnalyzer.analyze(&syntax, &semantics, &graph_metrics, &edges, 1);
        assert!(result.per_module["a"].layer.is_none());
        assert!(result
            .layer_violations
            .iter()
            .any(|v| v.violation_type == LayerViolationKind::Backward));
    }

    #[test]
    fn three_module_cycle_collapses_to_a_single_violation() {
        let mut syntax = HashMap::new();
        syntax.insert("api/a.py".to_string(), syntax_file("api/a.py"));
        syntax.insert("service/s.py".to_string(), syntax_file("service/s.py"));
        syntax.insert("data/d.py".to_string(), syntax_file("data/d.py"));
        let semantics: HashMap<String, FileSemantics> = HashMap::new();
        let graph_metrics = HashMap::new();
        let edges = vec![
            ("api/a.py".to_string(), "service/s.py".to_string()),
            ("service/s.py".to_string(), "data/d.py".to_string()),
            ("data/d.py".to_string(), "api/a.py".to_string()),
        ];

        let result = ArchitectureAnalyzer.analyze(&syntax, &semantics, &graph_metrics, &edges, 1);
        assert_eq!(result.layer_violations.len(), 1);
        assert_eq!(result.layer_violations[0].violation_type, LayerViolationKind::Backward);
        assert!(result.per_module["api"].layer.is_none());
        assert!(result.per_module["service"].layer.is_none());
        assert!(result.per_module["data"].layer.is_none());
    }

    #[test]
    fn instability_is_none_for_disconnected_module() {
        let mut syntax = HashMap::new();
        syntax.insert("lonely/z.py".to_string(), syntax_file("lonely/z.py"));
        let semantics = HashMap::new();
        let graph_metrics = HashMap::new();
        let result = ArchitectureAnalyzer.analyze(&syntax, &semantics, &graph_metrics, &[], 1);
        assert!(result.per_module["lonely"].instability.is_none());
    }
}
