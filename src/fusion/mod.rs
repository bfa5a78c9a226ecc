//! Signal Fusion (§4.6.1-4.6.3) — the component that turns five
//! independently-computed analyzer outputs into the single [`SignalField`]
//! the Pattern Executor consumes.
//!
//! Three jobs, in order: pick the [`Tier`] from file count, percentile-
//! normalize the fixed signal registry (with absolute floors), then fold
//! the normalized components into the composite `raw_risk`/`risk_score`/
//! `delta_h` signals (§4.6.3). Directory and global aggregates are derived
//! from the same per-file pass.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::architecture::ArchitectureResult;
use crate::core::diagnostics::Diagnostics;
use crate::core::hierarchy::{directory_of, module_key};
use crate::core::settings::Settings;
use crate::core::stats::percentile_rank;
use crate::model::{
    DirectorySignals, FileSemantics, FileSignals, FileSyntax, GlobalSignals, SignalField, Tier,
};
use crate::structural::StructuralResult;
use crate::temporal::TemporalResult;

/// Everything Signal Fusion reads, gathered from the earlier pipeline
/// stages (§2 data flow: Syntax -> {Structural, Temporal, Semantic} ->
/// Architecture -> Signal Fusion).
pub struct FusionInput<'a> {
    pub syntax: &'a HashMap<String, FileSyntax>,
    pub structural: &'a StructuralResult,
    pub temporal: Option<&'a TemporalResult>,
    pub semantics: &'a HashMap<String, FileSemantics>,
    pub architecture: &'a ArchitectureResult,
    pub settings: &'a Settings,
}

/// Author sets per module, used by the `CONWAY_VIOLATION` pattern. Derived
/// alongside the field but not persisted on it — it is an input to pattern
/// execution, not a reportable signal.
pub type ModuleAuthors = HashMap<String, BTreeSet<String>>;

/// Unordered module-pair edge counts (file-level import edges collapsed to
/// their containing modules), used by `CONWAY_VIOLATION`/module coupling
/// checks at pattern-execution time.
pub type ModuleEdges = HashMap<(String, String), usize>;

/// Result of fusion: the field itself plus data the Pattern Executor needs
/// but that isn't itself a reportable signal.
pub struct FusionResult {
    pub field: SignalField,
    pub module_authors: ModuleAuthors,
    pub module_edges: ModuleEdges,
    pub module_file_counts: HashMap<String, usize>,
}

/// Fixed registry of per-file signals that get percentile-normalized
/// (§4.6.2) when the tier supports it.
const PERCENTILE_SIGNALS: &[&str] = &[
    "pagerank",
    "blast_radius_size",
    "cognitive_load",
    "semantic_coherence",
    "bus_factor",
    "raw_risk",
];

/// Unifies all upstream signals into the fused [`SignalField`] (§4.6).
#[derive(Debug, Default)]
pub struct SignalFusion;

impl SignalFusion {
    pub fn fuse(&self, input: FusionInput<'_>, diagnostics: &mut Diagnostics) -> FusionResult {
        let tier = Tier::from_file_count(input.syntax.len());
        let module_depth = input.settings.module_depth;

        let module_of: HashMap<String, String> = input
            .syntax
            .keys()
            .map(|path| (path.clone(), module_key(path, module_depth)))
            .collect();
        let directory_of_file: HashMap<String, String> = input
            .syntax
            .keys()
            .map(|path| (path.clone(), directory_of(path)))
            .collect();

        let raw = build_raw_signals(&input, &module_of, &directory_of_file);

        let mut percentiles = if tier == Tier::Absolute {
            HashMap::new()
        } else {
            compute_percentile_tables(&raw, &input.settings.signal_floors)
        };

        let mut per_file = HashMap::with_capacity(raw.len());
        for (path, record) in &raw {
            let normalized = |name: &str, value: f64| -> f64 {
                match percentiles.get(name) {
                    Some(table) => percentile_floored(table, value, name, &input.settings.signal_floors),
                    None => min_max_normalize(&raw, name, value),
                }
            };

            let weights = &input.settings.risk_weights;
            let mut accumulated = 0.0;
            let mut weight_used = 0.0;

            accumulated += weights.pagerank * normalized("pagerank", record.pagerank);
            weight_used += weights.pagerank;
            accumulated += weights.blast_radius
                * normalized("blast_radius_size", record.blast_radius_size as f64);
            weight_used += weights.blast_radius;
            accumulated += weights.cognitive_load * normalized("cognitive_load", record.cognitive_load_raw);
            weight_used += weights.cognitive_load;
            accumulated += weights.instability * record.instability.unwrap_or(0.0);
            weight_used += weights.instability;
            if let Some(bus_factor) = record.bus_factor {
                accumulated += weights.bus_factor * (1.0 - normalized("bus_factor", bus_factor));
                weight_used += weights.bus_factor;
            }

            let raw_risk = if weight_used > f64::EPSILON {
                (accumulated / weight_used).clamp(0.0, 1.0)
            } else {
                0.0
            };

            per_file.insert(
                path.clone(),
                (record.clone(), raw_risk),
            );
        }

        let risk_table: Vec<f64> = {
            let mut values: Vec<f64> = per_file.values().map(|(_, r)| *r).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values
        };
        if tier != Tier::Absolute {
            percentiles.insert("raw_risk", risk_table.clone());
        }

        let undirected_neighbors = build_undirected_adjacency(&input.structural.edges);

        let mut file_signals: HashMap<String, FileSignals> = HashMap::with_capacity(per_file.len());
        for (path, (record, raw_risk)) in &per_file {
            let risk_score = if tier == Tier::Absolute {
                *raw_risk
            } else {
                percentile_rank(&risk_table, *raw_risk)
            };

            let mut file_percentiles = HashMap::new();
            if tier != Tier::Absolute {
                for &name in PERCENTILE_SIGNALS {
                    let value = match name {
                        "pagerank" => record.pagerank,
                        "blast_radius_size" => record.blast_radius_size as f64,
                        "cognitive_load" => record.cognitive_load_raw,
                        "semantic_coherence" => record.semantic_coherence,
                        "bus_factor" => record.bus_factor.unwrap_or(0.0),
                        "raw_risk" => *raw_risk,
                        _ => continue,
                    };
                    if name == "bus_factor" && record.bus_factor.is_none() {
                        continue;
                    }
                    if let Some(table) = percentiles.get(name) {
                        file_percentiles.insert(
                            name.to_string(),
                            percentile_floored(table, value, name, &input.settings.signal_floors),
                        );
                    }
                }
            }

            file_signals.insert(
                path.clone(),
                FileSignals {
                    path: path.clone(),
                    directory: record.directory.clone(),
                    module: record.module.clone(),
                    pagerank: record.pagerank,
                    betweenness: record.betweenness,
                    in_degree: record.in_degree,
                    out_degree: record.out_degree,
                    depth: record.depth,
                    is_orphan: record.is_orphan,
                    community: record.community,
                    blast_radius_size: record.blast_radius_size,
                    phantom_import_count: record.phantom_import_count,
                    is_entry_point: record.is_entry_point,
                    total_changes: record.total_changes,
                    trajectory: record.trajectory,
                    slope: record.slope,
                    cv: record.cv,
                    bus_factor: record.bus_factor,
                    fix_ratio: record.fix_ratio,
                    refactor_ratio: record.refactor_ratio,
                    concept_entropy: record.concept_entropy,
                    semantic_coherence: record.semantic_coherence,
                    naming_drift: record.naming_drift,
                    role: record.role,
                    cognitive_load: record.cognitive_load_raw,
                    lines: record.lines,
                    function_count: record.function_count,
                    stub_ratio: record.stub_ratio,
                    impl_gini: record.impl_gini,
                    raw_risk: *raw_risk,
                    risk_score,
                    delta_h: 0.0,
                    percentiles: file_percentiles,
                },
            );
        }

        // Delta-h Laplacian: one pass once every file's risk_score is known.
        let risk_by_path: HashMap<&str, f64> = file_signals
            .iter()
            .map(|(p, s)| (p.as_str(), s.risk_score))
            .collect();
        for (path, signals) in file_signals.iter_mut() {
            if signals.is_orphan {
                signals.delta_h = 0.0;
                continue;
            }
            let neighbors = undirected_neighbors.get(path.as_str());
            let neighbor_risk: Vec<f64> = neighbors
                .into_iter()
                .flatten()
                .filter_map(|n| risk_by_path.get(n.as_str()).copied())
                .collect();
            if neighbor_risk.is_empty() {
                signals.delta_h = 0.0;
            } else {
                let mean_neighbor = neighbor_risk.iter().sum::<f64>() / neighbor_risk.len() as f64;
                signals.delta_h = signals.risk_score - mean_neighbor;
            }
        }

        let per_directory = aggregate_directories(&file_signals, &percentiles, &input.settings.signal_floors);

        let module_authors = if let Some(temporal) = input.temporal {
            build_module_authors(&temporal.per_file, &module_of)
        } else {
            HashMap::new()
        };
        let module_edges = build_module_edges(&input.structural.edges, &module_of);
        let mut module_file_counts: HashMap<String, usize> = HashMap::new();
        for module in module_of.values() {
            *module_file_counts.entry(module.clone()).or_insert(0) += 1;
        }

        let global_signals = build_global_signals(
            &input,
            &file_signals,
            &module_authors,
        );

        diagnostics.check_signal_variance(
            "pagerank",
            &file_signals.values().map(|s| s.pagerank).collect::<Vec<_>>(),
        );
        diagnostics.check_signal_variance(
            "risk_score",
            &file_signals.values().map(|s| s.risk_score).collect::<Vec<_>>(),
        );

        let field = SignalField {
            per_file: file_signals,
            per_directory,
            per_module: input.architecture.per_module.clone(),
            global_signals,
            layer_violations: input.architecture.layer_violations.clone(),
            tier,
        };

        FusionResult {
            field,
            module_authors,
            module_edges,
            module_file_counts,
        }
    }
}

/// Pre-percentile per-file record: every raw component the composite and
/// percentile stages need, before normalization.
#[derive(Debug, Clone)]
struct RawFileRecord {
    directory: String,
    module: String,
    pagerank: f64,
    betweenness: f64,
    in_degree: usize,
    out_degree: usize,
    depth: i64,
    is_orphan: bool,
    community: usize,
    blast_radius_size: usize,
    phantom_import_count: usize,
    is_entry_point: bool,
    total_changes: Option<usize>,
    trajectory: Option<crate::model::Trajectory>,
    slope: Option<f64>,
    cv: Option<f64>,
    bus_factor: Option<f64>,
    fix_ratio: Option<f64>,
    refactor_ratio: Option<f64>,
    concept_entropy: f64,
    semantic_coherence: f64,
    naming_drift: f64,
    role: crate::model::FileRole,
    cognitive_load_raw: f64,
    lines: usize,
    function_count: usize,
    stub_ratio: f64,
    impl_gini: f64,
    instability: Option<f64>,
}

fn build_raw_signals(
    input: &FusionInput<'_>,
    module_of: &HashMap<String, String>,
    directory_of_file: &HashMap<String, String>,
) -> HashMap<String, RawFileRecord> {
    let mut out = HashMap::with_capacity(input.syntax.len());
    for (path, syntax) in input.syntax {
        let graph = input.structural.per_file.get(path);
        let semantics = input.semantics.get(path);
        let churn = input.temporal.and_then(|t| t.per_file.get(path));
        let module = module_of.get(path).cloned().unwrap_or_else(|| ".".to_string());
        let instability = input
            .architecture
            .per_module
            .get(&module)
            .and_then(|m| m.instability);

        let mean_nesting = if syntax.functions.is_empty() {
            0.0
        } else {
            syntax
                .functions
                .iter()
                .map(|f| f.nesting_depth as f64)
                .sum::<f64>()
                / syntax.functions.len() as f64
        };
        let concept_count = semantics.map(|s| s.concept_count).unwrap_or(0) as f64;
        let cognitive_load_raw = concept_count
            * syntax.complexity as f64
            * (1.0 + mean_nesting / 10.0)
            * (1.0 + syntax.impl_gini());

        out.insert(
            path.clone(),
            RawFileRecord {
                directory: directory_of_file.get(path).cloned().unwrap_or_default(),
                module,
                pagerank: graph.map(|g| g.pagerank).unwrap_or(0.0),
                betweenness: graph.map(|g| g.betweenness).unwrap_or(0.0),
                in_degree: graph.map(|g| g.in_degree).unwrap_or(0),
                out_degree: graph.map(|g| g.out_degree).unwrap_or(0),
                depth: graph.map(|g| g.depth).unwrap_or(-1),
                is_orphan: graph.map(|g| g.is_orphan).unwrap_or(false),
                community: graph.map(|g| g.community).unwrap_or(0),
                blast_radius_size: graph.map(|g| g.blast_radius_size).unwrap_or(0),
                phantom_import_count: syntax.phantom_import_count(),
                is_entry_point: graph.map(|g| g.is_entry_point).unwrap_or(false),
                total_changes: churn.map(|c| c.total_changes),
                trajectory: churn.map(|c| c.trajectory),
                slope: churn.map(|c| c.slope),
                cv: churn.map(|c| c.cv),
                bus_factor: churn.map(|c| c.bus_factor),
                fix_ratio: churn.map(|c| c.fix_ratio),
                refactor_ratio: churn.map(|c| c.refactor_ratio),
                concept_entropy: semantics.map(|s| s.concept_entropy).unwrap_or(0.0),
                semantic_coherence: semantics.map(|s| s.semantic_coherence).unwrap_or(1.0),
                naming_drift: semantics.map(|s| s.naming_drift).unwrap_or(0.0),
                role: semantics.map(|s| s.role).unwrap_or_default(),
                cognitive_load_raw,
                lines: syntax.lines,
                function_count: syntax.functions.len(),
                stub_ratio: syntax.stub_ratio(),
                impl_gini: syntax.impl_gini(),
                instability,
            },
        );
    }
    out
}

/// Per-signal sorted value tables used for percentile lookups.
type PercentileTables = HashMap<&'static str, Vec<f64>>;

fn compute_percentile_tables(
    raw: &HashMap<String, RawFileRecord>,
    _floors: &crate::core::settings::SignalFloors,
) -> PercentileTables {
    let mut tables: PercentileTables = HashMap::new();
    for &name in PERCENTILE_SIGNALS {
        if name == "raw_risk" {
            // raw_risk only exists once the composite pass runs; the caller
            // inserts its table after computing it.
            continue;
        }
        let mut values: Vec<f64> = raw
            .values()
            .filter_map(|r| signal_value(r, name))
            .collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        tables.insert(name, values);
    }
    tables
}

fn signal_value(record: &RawFileRecord, name: &str) -> Option<f64> {
    match name {
        "pagerank" => Some(record.pagerank),
        "blast_radius_size" => Some(record.blast_radius_size as f64),
        "cognitive_load" => Some(record.cognitive_load_raw),
        "semantic_coherence" => Some(record.semantic_coherence),
        "bus_factor" => record.bus_factor,
        _ => None,
    }
}

/// Percentile-rank `value` within `table`, forcing the result to `0.0` when
/// `value` falls below the signal's absolute floor (§4.6.2 invariant 5).
fn percentile_floored(
    table: &[f64],
    value: f64,
    signal_name: &str,
    floors: &crate::core::settings::SignalFloors,
) -> f64 {
    if let Some(floor) = floors.floor_for(signal_name) {
        if value < floor {
            return 0.0;
        }
    }
    percentile_rank(table, value)
}

fn min_max_normalize(raw: &HashMap<String, RawFileRecord>, name: &str, value: f64) -> f64 {
    let max = raw
        .values()
        .filter_map(|r| signal_value(r, name))
        .fold(0.0_f64, f64::max);
    if max <= f64::EPSILON {
        0.0
    } else {
        (value / max).clamp(0.0, 1.0)
    }
}

fn build_undirected_adjacency(edges: &[(String, String)]) -> HashMap<&str, Vec<&str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (a, b) in edges {
        adjacency.entry(a.as_str()).or_default().push(b.as_str());
        adjacency.entry(b.as_str()).or_default().push(a.as_str());
    }
    adjacency
}

fn build_module_authors(
    per_file_churn: &HashMap<String, crate::model::ChurnSeries>,
    module_of: &HashMap<String, String>,
) -> ModuleAuthors {
    let mut authors: ModuleAuthors = HashMap::new();
    for (path, churn) in per_file_churn {
        if let Some(module) = module_of.get(path) {
            authors
                .entry(module.clone())
                .or_default()
                .extend(churn.authors.iter().cloned());
        }
    }
    authors
}

/// Collapses file-level import edges into unordered module-pair counts,
/// dropping self-edges (an edge between two files in the same module).
fn build_module_edges(edges: &[(String, String)], module_of: &HashMap<String, String>) -> ModuleEdges {
    let mut counts: ModuleEdges = HashMap::new();
    for (a, b) in edges {
        let (Some(ma), Some(mb)) = (module_of.get(a), module_of.get(b)) else {
            continue;
        };
        if ma == mb {
            continue;
        }
        let key = if ma <= mb {
            (ma.clone(), mb.clone())
        } else {
            (mb.clone(), ma.clone())
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn aggregate_directories(
    file_signals: &HashMap<String, FileSignals>,
    percentiles: &PercentileTables,
    floors: &crate::core::settings::SignalFloors,
) -> HashMap<String, DirectorySignals> {
    let mut by_directory: HashMap<String, Vec<&FileSignals>> = HashMap::new();
    for signals in file_signals.values() {
        by_directory.entry(signals.directory.clone()).or_default().push(signals);
    }

    let risk_table = percentiles.get("raw_risk");

    let mut result = HashMap::with_capacity(by_directory.len());
    for (directory, files) in by_directory {
        let file_count = files.len();
        let n = file_count.max(1) as f64;

        let mean_risk = files.iter().map(|f| f.risk_score).sum::<f64>() / n;
        let mean_cognitive_load = files.iter().map(|f| f.cognitive_load).sum::<f64>() / n;
        let mean_naming_drift = files.iter().map(|f| f.naming_drift).sum::<f64>() / n;
        let mean_coherence = files.iter().map(|f| f.semantic_coherence).sum::<f64>() / n;

        let high_risk_files = files
            .iter()
            .filter(|f| match risk_table {
                Some(table) => percentile_floored(table, f.raw_risk, "raw_risk", floors) >= 0.8,
                None => f.risk_score >= 0.8,
            })
            .count();

        let total_changes: usize = files.iter().filter_map(|f| f.total_changes).sum();
        let hotspot_share = files
            .iter()
            .filter_map(|f| f.total_changes)
            .max()
            .filter(|_| total_changes > 0)
            .map(|max_changes| max_changes as f64 / total_changes as f64)
            .unwrap_or(0.0);

        let role_diversity = files.iter().map(|f| f.role).collect::<HashSet<_>>().len();
        let orphan_count = files.iter().filter(|f| f.is_orphan).count();
        let phantom_import_files = files.iter().filter(|f| f.phantom_import_count > 0).count();

        result.insert(
            directory,
            DirectorySignals {
                file_count,
                mean_risk,
                high_risk_files,
                hotspot_share,
                mean_cognitive_load,
                mean_naming_drift,
                role_diversity,
                total_changes,
                orphan_count,
                phantom_import_files,
                mean_coherence,
            },
        );
    }
    result
}

fn build_global_signals(
    input: &FusionInput<'_>,
    file_signals: &HashMap<String, FileSignals>,
    module_authors: &ModuleAuthors,
) -> GlobalSignals {
    let global = &input.structural.global;
    let n = file_signals.len().max(1) as f64;

    let mean_risk = file_signals.values().map(|f| f.risk_score).sum::<f64>() / n;

    let modules = &input.architecture.per_module;
    let module_count = modules.len().max(1) as f64;
    let modules_with_instability = modules.values().filter(|m| m.instability.is_some()).count();
    let glue_deficit = 1.0 - (modules_with_instability as f64 / module_count);

    let main_seq_values: Vec<f64> = modules.values().filter_map(|m| m.main_sequence_distance).collect();
    let mean_main_seq_fit = if main_seq_values.is_empty() {
        1.0
    } else {
        1.0 - (main_seq_values.iter().sum::<f64>() / main_seq_values.len() as f64)
    };
    let module_pair_count = (module_count * (module_count - 1.0) / 2.0).max(1.0);
    let layer_violation_penalty =
        (input.architecture.layer_violations.len() as f64 / module_pair_count).min(1.0);
    let architecture_health = ((mean_main_seq_fit + (1.0 - layer_violation_penalty)) / 2.0).clamp(0.0, 1.0);

    let codebase_health = ((1.0 - mean_risk) * 0.6
        + (1.0 - global.orphan_ratio) * 0.2
        + architecture_health * 0.2)
        .clamp(0.0, 1.0);

    // `module_authors` is currently only consumed at pattern-execution time
    // (Conway's-law comparisons); fusion just needs it built once.
    let _ = module_authors;

    GlobalSignals {
        modularity: global.modularity,
        fiedler_value: global.fiedler_value,
        spectral_gap: global.spectral_gap,
        cycle_count: global.cycle_count,
        centrality_gini: global.centrality_gini,
        orphan_ratio: global.orphan_ratio,
        glue_deficit,
        codebase_health,
        architecture_health,
        wiring_score: global.wiring_score,
        team_size: input.temporal.map(|t| t.team_size).unwrap_or(0),
        has_layering: input.architecture.has_layering,
        max_depth: input.architecture.max_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::ArchitectureAnalyzer;
    use crate::core::settings::Settings;
    use crate::model::{FunctionDef, ImportDecl};
    use crate::semantic::SemanticAnalyzer;
    use crate::structural::StructuralAnalyzer;

    fn syntax_file(path: &str, imports: Vec<&str>, has_main_guard: bool) -> FileSyntax {
        FileSyntax {
            path: path.to_string(),
            language: "py".to_string(),
            mtime: None,
            lines: 120,
            tokens: 100,
            complexity: 5,
            functions: vec![FunctionDef {
                name: "run".into(),
                params: vec![],
                body_tokens: 40,
                signature_tokens: 5,
                nesting_depth: 2,
                start_line: 1,
                end_line: 10,
                call_targets: Some(vec![]),
                decorators: vec![],
            }],
            classes: vec![],
            imports: imports
                .into_iter()
                .map(|s| ImportDecl {
                    source: s.to_string(),
                    names: vec![],
                    resolved_path: Some(s.to_string()),
                })
                .collect(),
            has_main_guard,
            used_fallback_parser: false,
        }
    }

    #[test]
    fn absolute_tier_has_no_percentiles() {
        let mut syntax = HashMap::new();
        for i in 0..5 {
            syntax.insert(format!("mod{i}/a.py"), syntax_file(&format!("mod{i}/a.py"), vec![], false));
        }
        let settings = Settings::default();
        let structural = StructuralAnalyzer.analyze(&syntax, &settings);
        let semantics = SemanticAnalyzer.analyze(&syntax);
        let architecture =
            ArchitectureAnalyzer.analyze(&syntax, &semantics, &structural.per_file, &structural.edges, 1);

        let input = FusionInput {
            syntax: &syntax,
            structural: &structural,
            temporal: None,
            semantics: &semantics,
            architecture: &architecture,
            settings: &settings,
        };
        let mut diagnostics = Diagnostics::default();
        let result = SignalFusion.fuse(input, &mut diagnostics);
        assert_eq!(result.field.tier, Tier::Absolute);
        assert!(result.field.per_file.values().all(|f| f.percentiles.is_empty()));
    }

    #[test]
    fn orphan_file_has_zero_delta_h() {
        let mut syntax = HashMap::new();
        syntax.insert("main.py".to_string(), syntax_file("main.py", vec![], true));
        syntax.insert("orphan.py".to_string(), syntax_file("orphan.py", vec![], false));
        let settings = Settings::default();
        let structural = StructuralAnalyzer.analyze(&syntax, &settings);
        let semantics = SemanticAnalyzer.analyze(&syntax);
        let architecture =
            ArchitectureAnalyzer.analyze(&syntax, &semantics, &structural.per_file, &structural.edges, 1);
        let input = FusionInput {
            syntax: &syntax,
            structural: &structural,
            temporal: None,
            semantics: &semantics,
            architecture: &architecture,
            settings: &settings,
        };
        let mut diagnostics = Diagnostics::default();
        let result = SignalFusion.fuse(input, &mut diagnostics);
        assert_eq!(result.field.per_file["orphan.py"].delta_h, 0.0);
    }
}
