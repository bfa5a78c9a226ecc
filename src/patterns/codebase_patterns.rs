//! CODEBASE-scoped patterns (§4.6.5).

use crate::model::{Effort, Evidence, Finding, Scope, Tier};

use super::{margin_high_bad, Pattern, PatternContext};

pub(super) fn register(patterns: &mut Vec<Box<dyn Pattern>>) {
    patterns.push(Box::new(FlatArchitecture));
}

struct FlatArchitecture;
impl Pattern for FlatArchitecture {
    fn name(&self) -> &'static str {
        "flat_architecture"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Absolute
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let t_glue = ctx.settings.threshold(self.name(), "glue_deficit", 0.5);
        let global = &ctx.field.global_signals;
        if global.max_depth > 1 || global.glue_deficit <= t_glue {
            return Vec::new();
        }
        vec![Finding {
            pattern_name: self.name().into(),
            files: Vec::new(),
            scope: Scope::Codebase,
            severity: 0.60,
            confidence: margin_high_bad(global.glue_deficit, t_glue),
            evidence: vec![
                Evidence {
                    signal_name: "max_depth".into(),
                    value: global.max_depth as f64,
                    percentile: None,
                    description: "module dependency graph has no meaningful layering".into(),
                },
                Evidence {
                    signal_name: "glue_deficit".into(),
                    value: global.glue_deficit,
                    percentile: None,
                    description: "most modules sit outside any coherent community boundary".into(),
                },
            ],
            suggestion: "introduce directory-level layering so modules can depend on abstractions instead of each other directly".into(),
            effort: Effort::High,
        }]
    }
}
