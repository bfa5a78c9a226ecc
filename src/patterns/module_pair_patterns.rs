//! MODULE_PAIR-scoped patterns (§4.6.5).

use crate::core::stats::jaccard;
use crate::model::{Effort, Evidence, Finding, Scope, Tier};

use super::{margin_high_bad, ordered_pair, Pattern, PatternContext};

pub(super) fn register(patterns: &mut Vec<Box<dyn Pattern>>) {
    patterns.push(Box::new(LayerViolationPattern));
    patterns.push(Box::new(ConwayViolation));
}

struct LayerViolationPattern;
impl Pattern for LayerViolationPattern {
    fn name(&self) -> &'static str {
        "layer_violation"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        ctx.field
            .layer_violations
            .iter()
            .map(|violation| Finding {
                pattern_name: self.name().into(),
                files: vec![violation.source_module.clone(), violation.target_module.clone()],
                scope: Scope::ModulePair,
                severity: 0.52,
                confidence: 1.0,
                evidence: vec![Evidence {
                    signal_name: "edge_count".into(),
                    value: violation.edge_count as f64,
                    percentile: None,
                    description: format!(
                        "{:?} dependency from layer {} to layer {}",
                        violation.violation_type, violation.source_layer, violation.target_layer
                    ),
                }],
                suggestion: "invert or remove the dependency that crosses layers out of order".into(),
                effort: Effort::High,
            })
            .collect()
    }
}

struct ConwayViolation;
impl Pattern for ConwayViolation {
    fn name(&self) -> &'static str {
        "conway_violation"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_distance = ctx.settings.threshold(self.name(), "author_distance", 0.8);
        let t_coupling = ctx.settings.threshold(self.name(), "coupling", 0.3);
        let mut findings = Vec::new();
        for ((module_a, module_b), edge_count) in ctx.module_edges {
            let authors_a = ctx.module_authors.get(module_a);
            let authors_b = ctx.module_authors.get(module_b);
            let (Some(authors_a), Some(authors_b)) = (authors_a, authors_b) else {
                continue;
            };
            if authors_a.is_empty() || authors_b.is_empty() {
                continue;
            }
            let author_distance = 1.0 - jaccard(authors_a, authors_b);

            let count_a = *ctx.module_file_counts.get(module_a).unwrap_or(&1) as f64;
            let count_b = *ctx.module_file_counts.get(module_b).unwrap_or(&1) as f64;
            let coupling = *edge_count as f64 / (count_a * count_b).max(1.0);

            if author_distance > t_distance && coupling > t_coupling {
                let key = ordered_pair(module_a, module_b);
                findings.push(Finding {
                    pattern_name: self.name().into(),
                    files: vec![key.0, key.1],
                    scope: Scope::ModulePair,
                    severity: 0.55,
                    confidence: margin_high_bad(author_distance, t_distance),
                    evidence: vec![
                        Evidence {
                            signal_name: "author_distance".into(),
                            value: author_distance,
                            percentile: None,
                            description: "tightly coupled modules are maintained by disjoint teams".into(),
                        },
                        Evidence {
                            signal_name: "coupling".into(),
                            value: coupling,
                            percentile: None,
                            description: "edge density between the two modules".into(),
                        },
                    ],
                    suggestion: "align team ownership with the modules' actual dependency structure".into(),
                    effort: Effort::High,
                });
            }
        }
        findings
    }
}
