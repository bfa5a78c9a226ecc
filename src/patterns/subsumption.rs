//! Fixed subsumption table (§4.6.6): if a parent pattern fires on a file,
//! its declared children are suppressed for that same file.

use std::collections::HashSet;

use crate::model::Finding;

/// `(parent, children)` entries. Required by spec: `god_file` subsumes
/// `review_blindspot` and `knowledge_silo`; `high_risk_hub` subsumes
/// `bug_attractor`.
const SUBSUMPTIONS: &[(&str, &[&str])] = &[
    ("god_file", &["review_blindspot", "knowledge_silo"]),
    ("high_risk_hub", &["bug_attractor"]),
];

/// Drops findings whose pattern is listed as a child of a parent pattern
/// that already fired on the same file set.
pub(super) fn apply(findings: Vec<Finding>) -> Vec<Finding> {
    let mut parent_files: HashSet<(&str, &str)> = HashSet::new();
    for finding in &findings {
        for (parent, _) in SUBSUMPTIONS {
            if finding.pattern_name == *parent {
                for file in &finding.files {
                    parent_files.insert((*parent, file.as_str()));
                }
            }
        }
    }

    findings
        .into_iter()
        .filter(|finding| {
            for (parent, children) in SUBSUMPTIONS {
                if children.contains(&finding.pattern_name.as_str()) {
                    let suppressed = finding
                        .files
                        .iter()
                        .any(|file| parent_files.contains(&(*parent, file.as_str())));
                    if suppressed {
                        return false;
                    }
                }
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Effort, Evidence, Scope};

    fn finding(pattern: &str, file: &str, severity: f64) -> Finding {
        Finding {
            pattern_name: pattern.to_string(),
            files: vec![file.to_string()],
            scope: Scope::File,
            severity,
            confidence: 1.0,
            evidence: Vec::<Evidence>::new(),
            suggestion: String::new(),
            effort: Effort::Low,
        }
    }

    #[test]
    fn god_file_suppresses_knowledge_silo_on_same_file() {
        let findings = vec![
            finding("god_file", "a.py", 0.8),
            finding("knowledge_silo", "a.py", 0.7),
            finding("knowledge_silo", "b.py", 0.7),
        ];
        let kept = apply(findings);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().any(|f| f.pattern_name == "god_file"));
        assert!(kept.iter().any(|f| f.files[0] == "b.py"));
    }

    #[test]
    fn truck_factor_and_knowledge_silo_are_not_mutually_suppressed() {
        let findings = vec![finding("truck_factor", "a.py", 0.85), finding("knowledge_silo", "a.py", 0.7)];
        let kept = apply(findings);
        assert_eq!(kept.len(), 2);
    }
}
