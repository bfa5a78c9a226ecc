//! DIRECTORY-scoped patterns (§4.6.5).

use crate::model::{Effort, Evidence, Finding, Scope, Tier};

use super::{margin_high_bad, Pattern, PatternContext};

pub(super) fn register(patterns: &mut Vec<Box<dyn Pattern>>) {
    patterns.push(Box::new(DirectoryHotspot));
}

struct DirectoryHotspot;
impl Pattern for DirectoryHotspot {
    fn name(&self) -> &'static str {
        "directory_hotspot"
    }
    fn tier_minimum(&self) -> Tier {
        Tier::Bayesian
    }
    fn evaluate(&self, ctx: &PatternContext<'_>) -> Vec<Finding> {
        let min_files = ctx.settings.threshold(self.name(), "min_files", 3.0) as usize;
        let t_high_risk = ctx.settings.threshold(self.name(), "high_risk_files", 2.0) as usize;
        let t_hotspot_share = ctx.settings.threshold(self.name(), "hotspot_share", 0.5);
        ctx.field
            .per_directory
            .iter()
            .filter(|(_, dir)| dir.file_count >= min_files && (dir.high_risk_files >= t_high_risk || dir.hotspot_share > t_hotspot_share))
            .map(|(path, dir)| Finding {
                pattern_name: self.name().into(),
                files: vec![path.clone()],
                scope: Scope::Directory,
                severity: 0.80,
                confidence: margin_high_bad(dir.hotspot_share, t_hotspot_share)
                    .max(margin_high_bad(dir.high_risk_files as f64, t_high_risk as f64)),
                evidence: vec![
                    Evidence {
                        signal_name: "high_risk_files".into(),
                        value: dir.high_risk_files as f64,
                        percentile: None,
                        description: "count of files in this directory with top-decile risk".into(),
                    },
                    Evidence {
                        signal_name: "hotspot_share".into(),
                        value: dir.hotspot_share,
                        percentile: None,
                        description: "share of directory churn concentrated in its hottest file".into(),
                    },
                ],
                suggestion: "review this directory as a unit; risk is concentrated rather than spread evenly".into(),
                effort: Effort::Medium,
            })
            .collect()
    }
}
