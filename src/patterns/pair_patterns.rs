//! FILE_PAIR-scoped patterns (§4.6.5).
//!
//! These iterate precomputed relations — co-change pairs, clone pairs, or
//! structural edges — rather than every unordered file pair, per §4.6.4
//! step 3 ("iterate only precomputed relations ... when the pattern
//! depends on that relation").

use std::collections::HashSet;

use crate::model::{Effort, Evidence, Finding, Scope, Tier};

use super::{margin_high_bad, margin_high_good, ordered_pair, Pattern, PatternContext};

pub(super) fn register(patterns: &mut Vec<Box<dyn Pattern>>) {
    patterns.push(Box::new(HiddenCoupling));
    patterns.push(Box::new(DeadDependency));
    patterns.push(Box::new(CopyPasteClone));
    patterns.push(Box::new(AccidentalCoupling));
    patterns.push(Box::new(DuplicateIncomplete));
}

fn has_structural_edge(ctx: &PatternContext<'_>, a: &str, b: &str) -> bool {
    ctx.file_edges.contains(&ordered_pair(a, b))
}

struct HiddenCoupling;
impl Pattern for HiddenCoupling {
    fn name(&self) -> &'static str {
        "hidden_coupling"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_confidence = ctx.settings.threshold(self.name(), "confidence", 0.5);
        ctx.co_change
            .iter()
            .filter(|pair| pair.lift >= 2.0 && pair.max_confidence() >= t_confidence)
            .filter(|pair| !has_structural_edge(ctx, &pair.file_a, &pair.file_b))
            .map(|pair| Finding {
                pattern_name: self.name().into(),
                files: vec![pair.file_a.clone(), pair.file_b.clone()],
                scope: Scope::FilePair,
                severity: 0.90,
                confidence: margin_high_bad(pair.max_confidence(), t_confidence),
                evidence: vec![Evidence {
                    signal_name: "lift".into(),
                    value: pair.lift,
                    percentile: None,
                    description: "files change together far more than chance would predict, with no import edge".into(),
                }],
                suggestion: "make the implicit dependency between these files explicit".into(),
                effort: Effort::Medium,
            })
            .collect()
    }
}

struct DeadDependency;
impl Pattern for DeadDependency {
    fn name(&self) -> &'static str {
        "dead_dependency"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let min_history = ctx.settings.git.min_commits.max(50);
        if ctx.total_commits < min_history {
            return Vec::new();
        }
        let cochange_pairs: HashSet<(String, String)> = ctx
            .co_change
            .iter()
            .map(|p| (p.file_a.clone(), p.file_b.clone()))
            .collect();

        ctx.file_edges
            .iter()
            .filter_map(|(a, b)| {
                let fa = ctx.field.per_file.get(a)?;
                let fb = ctx.field.per_file.get(b)?;
                let changed = fa.total_changes.unwrap_or(0) >= 1 && fb.total_changes.unwrap_or(0) >= 1;
                if changed && !cochange_pairs.contains(&(a.clone(), b.clone())) {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![a.clone(), b.clone()],
                        scope: Scope::FilePair,
                        severity: 0.40,
                        confidence: 0.6,
                        evidence: vec![Evidence {
                            signal_name: "cochange_count".into(),
                            value: 0.0,
                            percentile: None,
                            description: "modules never change together despite a direct dependency edge".into(),
                        }],
                        suggestion: "verify this dependency is still exercised".into(),
                        effort: Effort::Low,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct CopyPasteClone;
impl Pattern for CopyPasteClone {
    fn name(&self) -> &'static str {
        "copy_paste_clone"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        ctx.clones
            .iter()
            .map(|pair| Finding {
                pattern_name: self.name().into(),
                files: vec![pair.file_a.clone(), pair.file_b.clone()],
                scope: Scope::FilePair,
                severity: (0.50 + (0.3 - pair.ncd)).clamp(0.50, 0.80),
                confidence: margin_high_good(pair.ncd, 0.3),
                evidence: vec![Evidence {
                    signal_name: "ncd".into(),
                    value: pair.ncd,
                    percentile: None,
                    description: "near-duplicate content (normalized compression distance)".into(),
                }],
                suggestion: "extract the shared logic into one place".into(),
                effort: Effort::Medium,
            })
            .collect()
    }
}

struct AccidentalCoupling;
impl Pattern for AccidentalCoupling {
    fn name(&self) -> &'static str {
        "accidental_coupling"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let threshold = ctx.settings.threshold(self.name(), "concept_jaccard", 0.2);
        ctx.file_edges
            .iter()
            .filter_map(|(a, b)| {
                let similarity = ctx.concept_jaccard(&a, &b);
                if similarity < threshold {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![a.clone(), b.clone()],
                        scope: Scope::FilePair,
                        severity: 0.50,
                        confidence: margin_high_good(similarity, threshold),
                        evidence: vec![Evidence {
                            signal_name: "concept_jaccard".into(),
                            value: similarity,
                            percentile: None,
                            description: "directly coupled files share almost no vocabulary".into(),
                        }],
                        suggestion: "check whether this import is load-bearing or accidental".into(),
                        effort: Effort::Low,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct DuplicateIncomplete;
impl Pattern for DuplicateIncomplete {
    fn name(&self) -> &'static str {
        "duplicate_incomplete"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        ctx.clones
            .iter()
            .filter_map(|pair| {
                let fa = ctx.field.per_file.get(&pair.file_a)?;
                let fb = ctx.field.per_file.get(&pair.file_b)?;
                let incomplete = |f: &crate::model::FileSignals| f.stub_ratio > 0.3 || f.phantom_import_count > 0;
                if incomplete(fa) && incomplete(fb) {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![pair.file_a.clone(), pair.file_b.clone()],
                        scope: Scope::FilePair,
                        severity: 0.75,
                        confidence: 0.75,
                        evidence: vec![Evidence {
                            signal_name: "ncd".into(),
                            value: pair.ncd,
                            percentile: None,
                            description: "near-duplicate files that are both unfinished".into(),
                        }],
                        suggestion: "finish one copy and delete the other".into(),
                        effort: Effort::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
