//! Semantic Analyzer (§4.4) — concept extraction, coherence, naming drift,
//! role classification, and cognitive load.

pub mod tokenizer;

use std::collections::{HashMap, HashSet};

use crate::core::stats::shannon_entropy;
use crate::model::{Concept, FileRole, FileSemantics, FileSyntax};

/// Computes the semantic signal layer from parsed syntax (§4.4).
#[derive(Debug, Default)]
pub struct SemanticAnalyzer;

impl SemanticAnalyzer {
    pub fn analyze(&self, syntax: &HashMap<String, FileSyntax>) -> HashMap<String, FileSemantics> {
        syntax
            .iter()
            .map(|(path, file)| (path.clone(), self.analyze_file(path, file)))
            .collect()
    }

    fn analyze_file(&self, path: &str, file: &FileSyntax) -> FileSemantics {
        let mut weights: HashMap<String, f64> = HashMap::new();
        for function in &file.functions {
            add_tokens(&mut weights, &function.name, 1.0);
            for param in &function.params {
                add_tokens(&mut weights, param, 0.5);
            }
        }
        for class in &file.classes {
            add_tokens(&mut weights, &class.name, 1.0);
            for method in &class.methods {
                add_tokens(&mut weights, method, 0.5);
            }
            for field in &class.fields {
                add_tokens(&mut weights, field, 0.5);
            }
        }

        let clustered = tokenizer::cluster_by_prefix(&weights);
        let mut concepts: Vec<Concept> = clustered
            .into_iter()
            .map(|(topic, weight)| Concept { topic, weight })
            .collect();
        concepts.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));

        let concept_count = concepts.len();
        let weight_values: Vec<f64> = concepts.iter().map(|c| c.weight).collect();
        let concept_entropy = shannon_entropy(&weight_values);

        let semantic_coherence = if concept_count <= 1 {
            1.0
        } else {
            (1.0 - concept_entropy / (concept_count as f64).ln()).clamp(0.0, 1.0)
        };

        let filename_tokens: HashSet<String> = tokenizer::tokenize_filename(path).into_iter().collect();
        let concept_topics: HashSet<String> = concepts.iter().map(|c| c.topic.clone()).collect();
        let naming_drift = if filename_tokens.is_empty() && concept_topics.is_empty() {
            0.0
        } else {
            1.0 - crate::core::stats::jaccard(&filename_tokens, &concept_topics)
        };

        let role = classify_role(path, file);
        let cognitive_load = compute_cognitive_load(file, concept_entropy);

        FileSemantics {
            concepts,
            concept_count,
            concept_entropy,
            semantic_coherence,
            naming_drift,
            role,
            cognitive_load,
        }
    }
}

fn add_tokens(weights: &mut HashMap<String, f64>, identifier: &str, base_weight: f64) {
    for token in tokenizer::split_identifier(identifier) {
        *weights.entry(token).or_insert(0.0) += base_weight;
    }
}

/// Rule-based role classification (§4.4, §11 supplement): path conventions
/// and structural shape, cheapest signal first.
fn classify_role(path: &str, file: &FileSyntax) -> FileRole {
    let lower = path.to_ascii_lowercase();
    if file.is_test_file() {
        return FileRole::Test;
    }
    if file.has_main_guard {
        return FileRole::Entry;
    }
    if lower.contains("config") || lower.contains("settings") {
        return FileRole::Config;
    }
    if file.classes.iter().any(|c| c.is_abstract) || lower.contains("base") || lower.contains("abstract") {
        return FileRole::Base;
    }
    if lower.contains("model") || lower.contains("schema") || lower.contains("entity") {
        return FileRole::Model;
    }
    let is_data_holder = file
        .classes
        .iter()
        .any(|c| !c.fields.is_empty() && c.methods.len() <= 2);
    if is_data_holder {
        return FileRole::Model;
    }
    if lower.contains("service")
        || lower.contains("handler")
        || lower.contains("controller")
        || lower.contains("api")
        || file.functions.len() >= 3
    {
        return FileRole::Service;
    }
    FileRole::Unknown
}

/// Composite cognitive load: a normalized blend of nesting depth, function
/// volume, hollow-implementation share, and concept sprawl.
fn compute_cognitive_load(file: &FileSyntax, concept_entropy: f64) -> f64 {
    if file.functions.is_empty() {
        return 0.0;
    }
    let mean_nesting = file.functions.iter().map(|f| f.nesting_depth as f64).sum::<f64>()
        / file.functions.len() as f64;
    let function_volume = (file.functions.len() as f64).ln_1p() / 50_f64.ln_1p();
    let stub_component = file.stub_ratio();
    let entropy_component = concept_entropy / 8.0_f64.ln().max(1e-9);

    let raw = (mean_nesting / 5.0 + function_volume + stub_component + entropy_component) / 4.0;
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDef, FunctionDef};

    fn base_file(path: &str) -> FileSyntax {
        FileSyntax {
            path: path.to_string(),
            language: "py".to_string(),
            mtime: None,
            lines: 10,
            tokens: 10,
            complexity: 1,
            functions: vec![],
            classes: vec![],
            imports: vec![],
            has_main_guard: false,
            used_fallback_parser: false,
        }
    }

    #[test]
    fn test_file_is_classified_as_test() {
        let file = base_file("tests/test_auth.py");
        assert_eq!(classify_role("tests/test_auth.py", &file), FileRole::Test);
    }

    #[test]
    fn entry_point_outranks_other_heuristics() {
        let mut file = base_file("src/config_loader.py");
        file.has_main_guard = true;
        assert_eq!(classify_role("src/config_loader.py", &file), FileRole::Entry);
    }

    #[test]
    fn data_holder_class_is_classified_as_model() {
        let mut file = base_file("src/widgets.py");
        file.classes.push(ClassDef {
            name: "Widget".into(),
            bases: vec![],
            methods: vec![],
            fields: vec!["id".into(), "name".into()],
            is_abstract: false,
        });
        assert_eq!(classify_role("src/widgets.py", &file), FileRole::Model);
    }

    #[test]
    fn single_concept_file_is_fully_coherent() {
        let mut file = base_file("src/auth.py");
        file.functions.push(FunctionDef {
            name: "authenticate".into(),
            params: vec![],
            body_tokens: 20,
            signature_tokens: 5,
            nesting_depth: 1,
            start_line: 1,
            end_line: 5,
            call_targets: Some(vec![]),
            decorators: vec![],
        });
        let result = SemanticAnalyzer.analyze_file("src/auth.py", &file);
        assert_eq!(result.semantic_coherence, 1.0);
    }
}
