//! Import-graph construction and import resolution (§4.2).
//!
//! Builds the directed "A imports B" graph the rest of the Structural
//! Analyzer runs over, resolving each [`ImportDecl`] to a file in the
//! codebase where possible. Unresolved imports are phantom imports (§4.2) —
//! external/stdlib dependencies or genuinely broken references; this module
//! does not try to tell the two apart, it just counts them.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::FileSyntax;

/// The import graph plus the path <-> node-index lookup every other
/// structural computation needs.
pub struct ImportGraph {
    pub graph: DiGraph<String, ()>,
    pub index_of: HashMap<String, NodeIndex>,
    /// Imports per file that did not resolve to a known file (§4.2).
    pub phantom_counts: HashMap<String, usize>,
}

impl ImportGraph {
    /// Build the import graph from parsed syntax, resolving imports via a
    /// best-effort path-normalization match against the known file set.
    pub fn build(syntax: &HashMap<String, FileSyntax>) -> Self {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::with_capacity(syntax.len());
        for path in syntax.keys() {
            index_of.insert(path.clone(), graph.add_node(path.clone()));
        }

        let resolver = ImportResolver::build(syntax.keys());
        let mut phantom_counts = HashMap::with_capacity(syntax.len());

        for (path, file) in syntax {
            let from = index_of[path];
            let mut phantoms = 0;
            for import in &file.imports {
                match resolver.resolve(&import.source) {
                    Some(target) if target != *path => {
                        if let Some(&to) = index_of.get(&target) {
                            graph.add_edge(from, to, ());
                        } else {
                            phantoms += 1;
                        }
                    }
                    Some(_) => {}
                    None => phantoms += 1,
                }
            }
            phantom_counts.insert(path.clone(), phantoms);
        }

        Self {
            graph,
            index_of,
            phantom_counts,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Resolves an import source string to a known file path by normalizing
/// both dotted-module and path-style import syntax into a common key space.
struct ImportResolver {
    /// Normalized full-path key -> file path (unambiguous).
    by_key: HashMap<String, String>,
    /// Bare filename stem -> file path, only kept when unique.
    by_stem: HashMap<String, String>,
}

impl ImportResolver {
    fn build<'a>(paths: impl Iterator<Item = &'a String>) -> Self {
        let mut by_key = HashMap::new();
        let mut stem_counts: HashMap<String, usize> = HashMap::new();
        let mut by_stem = HashMap::new();

        let paths: Vec<&String> = paths.collect();
        for path in &paths {
            for key in normalized_keys(path) {
                by_key.insert(key, (*path).clone());
            }
            let stem = file_stem(path);
            *stem_counts.entry(stem.clone()).or_insert(0) += 1;
            by_stem.insert(stem, (*path).clone());
        }
        by_stem.retain(|stem, _| stem_counts.get(stem).copied().unwrap_or(0) == 1);

        Self { by_key, by_stem }
    }

    fn resolve(&self, source: &str) -> Option<String> {
        let cleaned = source.trim_start_matches("./").trim_start_matches('/');
        let dotted_to_slash = cleaned.replace("::", "/").replace('.', "/");

        for candidate in [cleaned.to_string(), dotted_to_slash] {
            if let Some(path) = self.by_key.get(&candidate) {
                return Some(path.clone());
            }
        }

        let last_segment = cleaned
            .rsplit(['/', '.', ':'])
            .find(|s| !s.is_empty())
            .unwrap_or(cleaned);
        self.by_stem.get(last_segment).cloned()
    }
}

/// Every normalized key a file path should be reachable under: the path
/// itself, the path without extension, and the dotted-module form of the
/// same (so `src/foo/bar.py` matches `src.foo.bar`, `foo.bar`, and `bar`).
fn normalized_keys(path: &str) -> Vec<String> {
    let without_ext = match path.rfind('.') {
        Some(idx) if path[idx..].len() <= 5 => &path[..idx],
        _ => path,
    };
    let components: Vec<&str> = without_ext.split('/').collect();

    let mut keys = vec![path.to_string(), without_ext.to_string()];
    for start in 0..components.len() {
        keys.push(components[start..].join("/"));
        keys.push(components[start..].join("."));
    }
    keys
}

fn file_stem(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => name[..idx].to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImportDecl;

    fn syntax_with_imports(path: &str, imports: Vec<&str>) -> FileSyntax {
        FileSyntax {
            path: path.to_string(),
            language: "py".to_string(),
            mtime: None,
            lines: 1,
            tokens: 1,
            complexity: 1,
            functions: vec![],
            classes: vec![],
            imports: imports
                .into_iter()
                .map(|s| ImportDecl {
                    source: s.to_string(),
                    names: vec![],
                    resolved_path: None,
                })
                .collect(),
            has_main_guard: false,
            used_fallback_parser: false,
        }
    }

    #[test]
    fn resolves_dotted_python_import_to_file() {
        let mut files = HashMap::new();
        files.insert(
            "src/util/helpers.py".to_string(),
            syntax_with_imports("src/util/helpers.py", vec![]),
        );
        files.insert(
            "src/main.py".to_string(),
            syntax_with_imports("src/main.py", vec!["util.helpers"]),
        );

        let graph = ImportGraph::build(&files);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.graph.edge_count(), 1);
    }

    #[test]
    fn unresolvable_import_adds_no_edge() {
        let mut files = HashMap::new();
        files.insert(
            "main.py".to_string(),
            syntax_with_imports("main.py", vec!["numpy"]),
        );
        let graph = ImportGraph::build(&files);
        assert_eq!(graph.graph.edge_count(), 0);
    }
}
