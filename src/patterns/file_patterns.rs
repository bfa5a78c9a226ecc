//! FILE-scoped patterns (§4.6.5).

use crate::model::{Effort, Evidence, Finding, FileRole, Scope, Tier, Trajectory};

use super::{average, looks_like_test_path, margin_high_bad, margin_high_good, Pattern, PatternContext};

pub(super) fn register(patterns: &mut Vec<Box<dyn Pattern>>) {
    patterns.push(Box::new(HighRiskHub));
    patterns.push(Box::new(GodFile));
    patterns.push(Box::new(OrphanCode));
    patterns.push(Box::new(HollowCode));
    patterns.push(Box::new(PhantomImports));
    patterns.push(Box::new(NamingDrift));
    patterns.push(Box::new(UnstableFile));
    patterns.push(Box::new(BugAttractor));
    patterns.push(Box::new(BugMagnet));
    patterns.push(Box::new(ThrashingCode));
    patterns.push(Box::new(KnowledgeSilo));
    patterns.push(Box::new(TruckFactor));
    patterns.push(Box::new(ReviewBlindspot));
    patterns.push(Box::new(WeakLink));
}

fn pctl(ctx: &PatternContext<'_>, path: &str, signal: &str) -> Option<f64> {
    ctx.field.per_file.get(path)?.percentiles.get(signal).copied()
}

struct HighRiskHub;
impl Pattern for HighRiskHub {
    fn name(&self) -> &'static str {
        "high_risk_hub"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for signals in ctx.field.per_file.values() {
            if !ctx.passes_hotspot_gate(signals.total_changes) {
                continue;
            }
            let (Some(pr), Some(br), Some(cl)) = (
                pctl(ctx, &signals.path, "pagerank"),
                pctl(ctx, &signals.path, "blast_radius_size"),
                pctl(ctx, &signals.path, "cognitive_load"),
            ) else {
                continue;
            };
            let t_pr = ctx.settings.threshold(self.name(), "pagerank", 0.90);
            let t_br = ctx.settings.threshold(self.name(), "blast_radius", 0.90);
            let t_cl = ctx.settings.threshold(self.name(), "cognitive_load", 0.85);
            if pr >= t_pr && br >= t_br && cl >= t_cl {
                let confidence = average(&[
                    margin_high_bad(pr, t_pr),
                    margin_high_bad(br, t_br),
                    margin_high_bad(cl, t_cl),
                ]);
                findings.push(Finding {
                    pattern_name: self.name().into(),
                    files: vec![signals.path.clone()],
                    scope: Scope::File,
                    severity: 0.90,
                    confidence,
                    evidence: vec![
                        Evidence {
                            signal_name: "pagerank".into(),
                            value: signals.pagerank,
                            percentile: Some(pr),
                            description: "central, high-blast-radius, high-complexity file".into(),
                        },
                        Evidence {
                            signal_name: "blast_radius_size".into(),
                            value: signals.blast_radius_size as f64,
                            percentile: Some(br),
                            description: "large share of the codebase transitively depends on it".into(),
                        },
                        Evidence {
                            signal_name: "cognitive_load".into(),
                            value: signals.cognitive_load,
                            percentile: Some(cl),
                            description: "high cognitive load concentrated in a load-bearing file".into(),
                        },
                    ],
                    suggestion: "split responsibilities out of this hub before extending it further".into(),
                    effort: Effort::High,
                });
            }
        }
        findings
    }
}

struct GodFile;
impl Pattern for GodFile {
    fn name(&self) -> &'static str {
        "god_file"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for signals in ctx.field.per_file.values() {
            let (Some(cl), Some(coh)) = (
                pctl(ctx, &signals.path, "cognitive_load"),
                pctl(ctx, &signals.path, "semantic_coherence"),
            ) else {
                continue;
            };
            let t_cl = ctx.settings.threshold(self.name(), "cognitive_load", 0.90);
            let t_coh = ctx.settings.threshold(self.name(), "coherence", 0.20);
            if cl >= t_cl && coh <= t_coh && signals.function_count >= 3 {
                let confidence = average(&[margin_high_bad(cl, t_cl), margin_high_good(coh, t_coh)]);
                findings.push(Finding {
                    pattern_name: self.name().into(),
                    files: vec![signals.path.clone()],
                    scope: Scope::File,
                    severity: 0.80,
                    confidence,
                    evidence: vec![
                        Evidence {
                            signal_name: "cognitive_load".into(),
                            value: signals.cognitive_load,
                            percentile: Some(cl),
                            description: "cognitive load in the top tail of the codebase".into(),
                        },
                        Evidence {
                            signal_name: "semantic_coherence".into(),
                            value: signals.semantic_coherence,
                            percentile: Some(coh),
                            description: "concepts inside the file are scattered, not focused".into(),
                        },
                    ],
                    suggestion: "split this file along its distinct concept clusters".into(),
                    effort: Effort::High,
                });
            }
        }
        findings
    }
}

struct OrphanCode;
impl Pattern for OrphanCode {
    fn name(&self) -> &'static str {
        "orphan_code"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        ctx.field
            .per_file
            .values()
            .filter(|f| f.is_orphan && !f.is_entry_point && !looks_like_test_path(&f.path))
            .map(|f| Finding {
                pattern_name: self.name().into(),
                files: vec![f.path.clone()],
                scope: Scope::File,
                severity: 0.55,
                confidence: 1.0,
                evidence: vec![Evidence {
                    signal_name: "in_degree".into(),
                    value: f.in_degree as f64,
                    percentile: None,
                    description: "nothing in the codebase imports this file".into(),
                }],
                suggestion: "confirm this file is still needed, or remove it".into(),
                effort: Effort::Low,
            })
            .collect()
    }
}

struct HollowCode;
impl Pattern for HollowCode {
    fn name(&self) -> &'static str {
        "hollow_code"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_stub = ctx.settings.threshold(self.name(), "stub_ratio", 0.6);
        let t_gini = ctx.settings.threshold(self.name(), "impl_gini", 0.6);
        ctx.field
            .per_file
            .values()
            .filter(|f| f.stub_ratio > t_stub && f.impl_gini > t_gini && f.function_count >= 3)
            .map(|f| Finding {
                pattern_name: self.name().into(),
                files: vec![f.path.clone()],
                scope: Scope::File,
                severity: 0.71,
                confidence: average(&[margin_high_bad(f.stub_ratio, t_stub), margin_high_bad(f.impl_gini, t_gini)]),
                evidence: vec![
                    Evidence {
                        signal_name: "stub_ratio".into(),
                        value: f.stub_ratio,
                        percentile: None,
                        description: "most functions are stubs or near-empty".into(),
                    },
                    Evidence {
                        signal_name: "impl_gini".into(),
                        value: f.impl_gini,
                        percentile: None,
                        description: "implementation effort is concentrated in a few functions".into(),
                    },
                ],
                suggestion: "finish the stubbed-out functions or remove them".into(),
                effort: Effort::Medium,
            })
            .collect()
    }
}

struct PhantomImports;
impl Pattern for PhantomImports {
    fn name(&self) -> &'static str {
        "phantom_imports"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        ctx.field
            .per_file
            .values()
            .filter(|f| f.phantom_import_count > 0)
            .map(|f| {
                let severity = (0.65 + 0.05 * (f.phantom_import_count.min(4) - 1) as f64).min(0.80);
                Finding {
                    pattern_name: self.name().into(),
                    files: vec![f.path.clone()],
                    scope: Scope::File,
                    severity,
                    confidence: (f.phantom_import_count as f64 / 4.0).min(1.0),
                    evidence: vec![Evidence {
                        signal_name: "phantom_import_count".into(),
                        value: f.phantom_import_count as f64,
                        percentile: None,
                        description: "imports that did not resolve to a file in the codebase".into(),
                    }],
                    suggestion: "fix or remove the unresolved imports".into(),
                    effort: Effort::Low,
                }
            })
            .collect()
    }
}

struct NamingDrift;
impl Pattern for NamingDrift {
    fn name(&self) -> &'static str {
        "naming_drift"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let threshold = ctx.settings.threshold(self.name(), "naming_drift", 0.7);
        ctx.field
            .per_file
            .values()
            .filter(|f| f.naming_drift > threshold)
            .map(|f| Finding {
                pattern_name: self.name().into(),
                files: vec![f.path.clone()],
                scope: Scope::File,
                severity: 0.45,
                confidence: margin_high_bad(f.naming_drift, threshold),
                evidence: vec![Evidence {
                    signal_name: "naming_drift".into(),
                    value: f.naming_drift,
                    percentile: None,
                    description: "filename shares little vocabulary with the file's content".into(),
                }],
                suggestion: "rename the file to reflect what it actually does".into(),
                effort: Effort::Low,
            })
            .collect()
    }
}

struct UnstableFile;
impl Pattern for UnstableFile {
    fn name(&self) -> &'static str {
        "unstable_file"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        ctx.field
            .per_file
            .values()
            .filter(|f| {
                ctx.passes_hotspot_gate(f.total_changes)
                    && matches!(f.trajectory, Some(Trajectory::Churning) | Some(Trajectory::Spiking))
            })
            .map(|f| Finding {
                pattern_name: self.name().into(),
                files: vec![f.path.clone()],
                scope: Scope::File,
                severity: 0.70,
                confidence: 0.70,
                evidence: vec![Evidence {
                    signal_name: "total_changes".into(),
                    value: f.total_changes.unwrap_or(0) as f64,
                    percentile: None,
                    description: "change volume well above the codebase's hotspot median".into(),
                }],
                suggestion: "investigate why this file keeps churning before adding more to it".into(),
                effort: Effort::Medium,
            })
            .collect()
    }
}

struct BugAttractor;
impl Pattern for BugAttractor {
    fn name(&self) -> &'static str {
        "bug_attractor"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_fix = ctx.settings.threshold(self.name(), "fix_ratio", 0.4);
        let t_pr = ctx.settings.threshold(self.name(), "pagerank", 0.80);
        let mut findings = Vec::new();
        for f in ctx.field.per_file.values() {
            if !ctx.passes_hotspot_gate(f.total_changes) {
                continue;
            }
            let Some(fix_ratio) = f.fix_ratio else { continue };
            let Some(pr) = pctl(ctx, &f.path, "pagerank") else { continue };
            if fix_ratio > t_fix && pr > t_pr {
                findings.push(Finding {
                    pattern_name: self.name().into(),
                    files: vec![f.path.clone()],
                    scope: Scope::File,
                    severity: 0.70,
                    confidence: average(&[margin_high_bad(fix_ratio, t_fix), margin_high_bad(pr, t_pr)]),
                    evidence: vec![
                        Evidence {
                            signal_name: "fix_ratio".into(),
                            value: fix_ratio,
                            percentile: None,
                            description: "most commits touching this file are bug fixes".into(),
                        },
                        Evidence {
                            signal_name: "pagerank".into(),
                            value: f.pagerank,
                            percentile: Some(pr),
                            description: "file is structurally central".into(),
                        },
                    ],
                    suggestion: "add regression coverage before the next change to this file".into(),
                    effort: Effort::Medium,
                });
            }
        }
        findings
    }
}

struct BugMagnet;
impl Pattern for BugMagnet {
    fn name(&self) -> &'static str {
        "bug_magnet"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_fix = ctx.settings.threshold(self.name(), "fix_ratio", 0.4);
        ctx.field
            .per_file
            .values()
            .filter(|f| ctx.passes_hotspot_gate(f.total_changes))
            .filter_map(|f| {
                let fix_ratio = f.fix_ratio?;
                let total = f.total_changes.unwrap_or(0);
                if fix_ratio > t_fix && total >= 5 {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![f.path.clone()],
                        scope: Scope::File,
                        severity: 0.80,
                        confidence: margin_high_bad(fix_ratio, t_fix),
                        evidence: vec![Evidence {
                            signal_name: "fix_ratio".into(),
                            value: fix_ratio,
                            percentile: None,
                            description: "recurring source of bug-fix commits".into(),
                        }],
                        suggestion: "root-cause the recurring failures instead of patching symptoms".into(),
                        effort: Effort::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct ThrashingCode;
impl Pattern for ThrashingCode {
    fn name(&self) -> &'static str {
        "thrashing_code"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let size_floor = ctx.settings.threshold(self.name(), "lines", 30.0);
        ctx.field
            .per_file
            .values()
            .filter(|f| ctx.passes_hotspot_gate(f.total_changes) && f.lines as f64 >= size_floor)
            .filter_map(|f| {
                let cv = f.cv?;
                let spiking = matches!(f.trajectory, Some(Trajectory::Spiking));
                if spiking || cv > 1.5 {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![f.path.clone()],
                        scope: Scope::File,
                        severity: 0.75,
                        confidence: if spiking { 1.0 } else { margin_high_bad(cv, 1.5) },
                        evidence: vec![Evidence {
                            signal_name: "cv".into(),
                            value: cv,
                            percentile: None,
                            description: "change rate is highly volatile across time windows".into(),
                        }],
                        suggestion: "stabilize requirements for this file before further change".into(),
                        effort: Effort::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct KnowledgeSilo;
impl Pattern for KnowledgeSilo {
    fn name(&self) -> &'static str {
        "knowledge_silo"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_pr = ctx.settings.threshold(self.name(), "pagerank", 0.75);
        if ctx.field.global_signals.team_size <= 1 {
            return Vec::new();
        }
        ctx.field
            .per_file
            .values()
            .filter(|f| ctx.passes_hotspot_gate(f.total_changes))
            .filter_map(|f| {
                let bus_factor = f.bus_factor?;
                let pr = pctl(ctx, &f.path, "pagerank")?;
                if bus_factor <= 1.5 && pr > t_pr {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![f.path.clone()],
                        scope: Scope::File,
                        severity: 0.70,
                        confidence: average(&[margin_high_good(bus_factor, 1.5), margin_high_bad(pr, t_pr)]),
                        evidence: vec![Evidence {
                            signal_name: "bus_factor".into(),
                            value: bus_factor,
                            percentile: None,
                            description: "a central file effectively owned by one person".into(),
                        }],
                        suggestion: "pair or rotate ownership of this file across the team".into(),
                        effort: Effort::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct TruckFactor;
impl Pattern for TruckFactor {
    fn name(&self) -> &'static str {
        "truck_factor"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_pr = ctx.settings.threshold(self.name(), "pagerank", 0.70);
        ctx.field
            .per_file
            .values()
            .filter(|f| ctx.passes_hotspot_gate(f.total_changes) && f.lines >= 50)
            .filter_map(|f| {
                let bus_factor = f.bus_factor?;
                if (bus_factor - 1.0).abs() > 1e-9 {
                    return None;
                }
                let pr = pctl(ctx, &f.path, "pagerank").unwrap_or(0.0);
                if pr >= t_pr || f.blast_radius_size >= 3 {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![f.path.clone()],
                        scope: Scope::File,
                        severity: 0.85,
                        confidence: margin_high_bad(pr.max(f.blast_radius_size as f64 / 10.0), t_pr.min(0.3)),
                        evidence: vec![Evidence {
                            signal_name: "bus_factor".into(),
                            value: bus_factor,
                            percentile: None,
                            description: "exactly one contributor has ever touched this file".into(),
                        }],
                        suggestion: "document this file and onboard a second maintainer".into(),
                        effort: Effort::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

struct ReviewBlindspot;
impl Pattern for ReviewBlindspot {
    fn name(&self) -> &'static str {
        "review_blindspot"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn requires_temporal(&self) -> bool {
        true
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_pr = ctx.settings.threshold(self.name(), "pagerank", 0.75);
        ctx.field
            .per_file
            .values()
            .filter(|f| ctx.passes_hotspot_gate(f.total_changes) && f.role != FileRole::Test)
            .filter_map(|f| {
                let bus_factor = f.bus_factor?;
                let pr = pctl(ctx, &f.path, "pagerank")?;
                if bus_factor <= 1.5 && pr > t_pr && !directory_has_test_file(ctx, &f.directory) {
                    Some(Finding {
                        pattern_name: self.name().into(),
                        files: vec![f.path.clone()],
                        scope: Scope::File,
                        severity: 0.80,
                        confidence: average(&[margin_high_good(bus_factor, 1.5), margin_high_bad(pr, t_pr)]),
                        evidence: vec![Evidence {
                            signal_name: "bus_factor".into(),
                            value: bus_factor,
                            percentile: None,
                            description: "central file with no test coverage in its directory".into(),
                        }],
                        suggestion: "add tests for this file before its only maintainer moves on".into(),
                        effort: Effort::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

fn directory_has_test_file(ctx: &PatternContext<'_>, directory: &str) -> bool {
    ctx.field
        .per_file
        .values()
        .any(|f| f.directory == directory && (f.role == FileRole::Test || looks_like_test_path(&f.path)))
}

struct WeakLink;
impl Pattern for WeakLink {
    fn name(&self) -> &'static str {
        "weak_link"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let threshold = ctx.settings.threshold(self.name(), "delta_h", 0.4);
        ctx.field
            .per_file
            .values()
            .filter(|f| ctx.passes_hotspot_gate(f.total_changes) && !f.is_orphan && f.delta_h > threshold)
            .map(|f| Finding {
                pattern_name: self.name().into(),
                files: vec![f.path.clone()],
                scope: Scope::File,
                severity: 0.75,
                confidence: margin_high_bad(f.delta_h, threshold),
                evidence: vec![Evidence {
                    signal_name: "delta_h".into(),
                    value: f.delta_h,
                    percentile: None,
                    description: "riskier than its direct neighbors in the import graph".into(),
                }],
                suggestion: "bring this file's risk profile in line with its neighbors".into(),
                effort: Effort::Medium,
            })
            .collect()
    }
}
