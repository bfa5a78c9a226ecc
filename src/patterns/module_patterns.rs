//! MODULE-scoped patterns (§4.6.5).

use crate::model::{Effort, Evidence, Finding, Scope, Tier};

use super::{margin_high_good, Pattern, PatternContext};

pub(super) fn register(patterns: &mut Vec<Box<dyn Pattern>>) {
    patterns.push(Box::new(ZoneOfPain));
    patterns.push(Box::new(BoundaryMismatch));
}

struct ZoneOfPain;
impl Pattern for ZoneOfPain {
    fn name(&self) -> &'static str {
        "zone_of_pain"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_abstractness = ctx.settings.threshold(self.name(), "abstractness", 0.3);
        let t_instability = ctx.settings.threshold(self.name(), "instability", 0.3);
        ctx.field
            .per_module
            .iter()
            .filter_map(|(module, summary)| {
                let instability = summary.instability?;
                if summary.abstractness < t_abstractness && instability < t_instability {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![module.clone()],
                        scope: Scope::Module,
                        severity: 0.60,
                        confidence: margin_high_good(instability, t_instability)
                            .max(margin_high_good(summary.abstractness, t_abstractness)),
                        evidence: vec![
                            Evidence {
                                signal_name: "abstractness".into(),
                                value: summary.abstractness,
                                percentile: None,
                                description: "concrete, rigid, hard to extend without breaking consumers".into(),
                            },
                            Evidence {
                                signal_name: "instability".into(),
                                value: instability,
                                percentile: None,
                                description: "few outgoing dependencies to absorb the rigidity".into(),
                            },
                        ],
                        suggestion: "introduce an abstraction seam before this module gets harder to change".into(),
                        effort: Effort::High,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct BoundaryMismatch;
impl Pattern for BoundaryMismatch {
    fn name(&self) -> &'static str {
        "boundary_mismatch"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let threshold = ctx.settings.threshold(self.name(), "boundary_alignment", 0.7);
        ctx.field
            .per_module
            .iter()
            .filter(|(_, summary)| summary.boundary_alignment < threshold && summary.file_count > 2)
            .map(|(module, summary)| Finding {
                pattern_name: self.name().into(),
                files: vec![module.clone()],
                scope: Scope::Module,
                severity: 0.60,
                confidence: margin_high_good(summary.boundary_alignment, threshold),
                evidence: vec![Evidence {
                    signal_name: "boundary_alignment".into(),
                    value: summary.boundary_alignment,
                    percentile: None,
                    description: "directory boundary doesn't match the actual community partition".into(),
                }],
                suggestion: "reorganize this module's files along their real collaboration boundaries".into(),
                effort: Effort::High,
            })
            .collect()
    }
}
