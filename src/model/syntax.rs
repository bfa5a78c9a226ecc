//! Per-file AST summary produced by the Syntax Extractor (§3, §4.1).

use serde::{Deserialize, Serialize};

/// A single function or method definition extracted from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function or method name.
    pub name: String,
    /// Parameter names, in declaration order.
    pub params: Vec<String>,
    /// Token count inside the function body.
    pub body_tokens: usize,
    /// Token count of the signature (name + params + annotations).
    pub signature_tokens: usize,
    /// Maximum nesting depth of conditional/loop/try constructs in the body.
    pub nesting_depth: usize,
    /// 1-based start line.
    pub start_line: usize,
    /// 1-based end line.
    pub end_line: usize,
    /// Syntactic call targets resolved to symbol names.
    ///
    /// `None` when this function was extracted by the regex fallback path
    /// (§4.1) — downstream call-graph-derived patterns must treat `None`
    /// as "unknown", never as "no calls".
    pub call_targets: Option<Vec<String>>,
    /// Decorator/attribute names attached to this function, if the
    /// language has them.
    pub decorators: Vec<String>,
}

impl FunctionDef {
    /// Per-function stub score in `[0, 1]` (§3, design-critical definition).
    ///
    /// - `body_tokens < 3` → `1.0` (pure stub)
    /// - `body_tokens < 10` → `0.0` (valid one-liner)
    /// - otherwise → `max(0, 1 - body_tokens / signature_tokens)`
    pub fn stub_score(&self) -> f64 {
        if self.body_tokens < 3 {
            return 1.0;
        }
        if self.body_tokens < 10 {
            return 0.0;
        }
        if self.signature_tokens == 0 {
            return 0.0;
        }
        (1.0 - self.body_tokens as f64 / self.signature_tokens as f64).max(0.0)
    }
}

/// A class/interface/struct definition extracted from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class name.
    pub name: String,
    /// Direct base class / interface names.
    pub bases: Vec<String>,
    /// Method names declared on this class.
    pub methods: Vec<String>,
    /// Field names declared on this class.
    pub fields: Vec<String>,
    /// True for interfaces/traits/ABCs/Protocols/pure-virtual classes.
    pub is_abstract: bool,
}

/// A single import/require/use declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Raw import source as written (module path, relative path, etc).
    pub source: String,
    /// Names imported from `source` (empty for a bare module import).
    pub names: Vec<String>,
    /// Path of the file this import resolved to, within the codebase.
    ///
    /// `None` marks a *phantom import* (§4.2): either an external/stdlib
    /// dependency or a genuinely broken reference.
    pub resolved_path: Option<String>,
}

/// Language-agnostic AST summary for one source file (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSyntax {
    /// Path relative to the codebase root.
    pub path: String,
    /// Detected language key (e.g. "py", "rs", "ts").
    pub language: String,
    /// Modification time as a Unix timestamp, if known.
    pub mtime: Option<i64>,
    /// Total line count.
    pub lines: usize,
    /// Total token count.
    pub tokens: usize,
    /// Aggregate cyclomatic-style complexity across all functions.
    pub complexity: usize,
    /// Functions/methods found in this file.
    pub functions: Vec<FunctionDef>,
    /// Classes/interfaces/structs found in this file.
    pub classes: Vec<ClassDef>,
    /// Import declarations found in this file.
    pub imports: Vec<ImportDecl>,
    /// True if the file has a `main`-guard / entry-point marker
    /// (`if __name__ == "__main__"`, `func main()`, a `main.rs`, ...).
    pub has_main_guard: bool,
    /// True when this file was parsed by the regex fallback rather than
    /// the structural (tree-sitter) parser.
    pub used_fallback_parser: bool,
}

impl FileSyntax {
    /// Mean stub score across all functions (`0.0` for a file with none).
    pub fn stub_ratio(&self) -> f64 {
        if self.functions.is_empty() {
            return 0.0;
        }
        let total: f64 = self.functions.iter().map(FunctionDef::stub_score).sum();
        total / self.functions.len() as f64
    }

    /// Gini coefficient of `body_tokens` across all functions, measuring
    /// how unevenly implementation effort is distributed (`0` = uniform).
    pub fn impl_gini(&self) -> f64 {
        let mut sizes: Vec<f64> = self
            .functions
            .iter()
            .map(|f| f.body_tokens as f64)
            .collect();
        crate::core::stats::gini(&mut sizes)
    }

    /// Number of imports that did not resolve to a file in the codebase.
    pub fn phantom_import_count(&self) -> usize {
        self.imports
            .iter()
            .filter(|i| i.resolved_path.is_none())
            .count()
    }

    /// Whether this looks like a test file, by a simple path heuristic.
    pub fn is_test_file(&self) -> bool {
        let lower = self.path.to_ascii_lowercase();
        lower.contains("test") || lower.contains("spec")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(body_tokens: usize, signature_tokens: usize) -> FunctionDef {
        FunctionDef {
            name: "f".into(),
            params: vec![],
            body_tokens,
            signature_tokens,
            nesting_depth: 0,
            start_line: 1,
            end_line: 2,
            call_targets: Some(vec![]),
            decorators: vec![],
        }
    }

    #[test]
    fn stub_score_pure_stub() {
        assert_eq!(func(2, 10).stub_score(), 1.0);
    }

    #[test]
    fn stub_score_valid_one_liner() {
        assert_eq!(func(9, 20).stub_score(), 0.0);
    }

    #[test]
    fn stub_score_hollow_body_relative_to_signature() {
        let score = func(5, 100).stub_score();
        assert!((score - 0.95).abs() < 1e-9);
    }

    #[test]
    fn stub_score_never_negative() {
        let score = func(50, 10).stub_score();
        assert_eq!(score, 0.0);
    }
}
