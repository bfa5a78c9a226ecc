//! Regex-based fallback extractor (§4.1).
//!
//! Used when no tree-sitter grammar is registered for a file's language, or
//! when the structural parser fails on a specific file. Recovers a coarse
//! but still useful [`FileSyntax`]: function/class boundaries and imports
//! via line-oriented regexes, never call graphs — `call_targets` is always
//! `None`, the sentinel downstream call-graph-derived signals must respect.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ClassDef, FileSyntax, FunctionDef, ImportDecl};

static PY_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)").unwrap());
static PY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)class\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(([^)]*)\))?").unwrap());
static PY_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+([\w\.]+)").unwrap());
static PY_FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*from\s+([\w\.]+)\s+import\s+(.+)$").unwrap());

static CLIKE_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:public\s+|private\s+|protected\s+|static\s+|async\s+|pub\s+(?:\(\w+\)\s+)?)*(?:fn|function|func|def)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)",
    )
    .unwrap()
});
static CLIKE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:public\s+|pub\s+)?(?:class|struct|interface|trait|type)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static CLIKE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:import|use|require)\b.*['"]?([\w\./:@-]+)['"]?"#).unwrap()
});

static MAIN_GUARD_MARKERS: &[&str] = &[
    "if __name__ == \"__main__\"",
    "if __name__ == '__main__'",
    "func main(",
    "fn main(",
    "require.main === module",
];

/// Extract a coarse [`FileSyntax`] from source text using only regexes,
/// without any language-aware grammar.
pub fn extract(path: &str, language_key: &str, source: &str) -> FileSyntax {
    let lines: Vec<&str> = source.lines().collect();
    let mut functions = Vec::new();
    let mut classes = Vec::new();
    let mut imports = Vec::new();

    let python_like = language_key == "py";

    for (idx, line) in lines.iter().enumerate() {
        if python_like {
            if let Some(caps) = PY_DEF.captures(line) {
                functions.push(build_python_function(&lines, idx, &caps));
                continue;
            }
            if let Some(caps) = PY_CLASS.captures(line) {
                classes.push(build_python_class(&caps));
                continue;
            }
            if let Some(caps) = PY_FROM_IMPORT.captures(line) {
                imports.push(ImportDecl {
                    source: caps[1].to_string(),
                    names: caps[2]
                        .split(',')
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                        .collect(),
                    resolved_path: None,
                });
                continue;
            }
            if let Some(caps) = PY_IMPORT.captures(line) {
                imports.push(ImportDecl {
                    source: caps[1].to_string(),
                    names: vec![],
                    resolved_path: None,
                });
                continue;
            }
        } else {
            if let Some(caps) = CLIKE_FN.captures(line) {
                functions.push(build_clike_function(&lines, idx, &caps));
                continue;
            }
            if let Some(caps) = CLIKE_CLASS.captures(line) {
                classes.push(ClassDef {
                    name: caps[1].to_string(),
                    bases: vec![],
                    methods: vec![],
                    fields: vec![],
                    is_abstract: line.contains("interface") || line.contains("trait"),
                });
                continue;
            }
            if let Some(caps) = CLIKE_IMPORT.captures(line) {
                imports.push(ImportDecl {
                    source: caps[1].to_string(),
                    names: vec![],
                    resolved_path: None,
                });
                continue;
            }
        }
    }

    let tokens: usize = lines.iter().map(|l| count_line_tokens(l)).sum();
    let has_main_guard = MAIN_GUARD_MARKERS.iter().any(|m| source.contains(m));
    let complexity = functions.len().max(1).min(lines.len().max(1));

    FileSyntax {
        path: path.to_string(),
        language: language_key.to_string(),
        mtime: None,
        lines: lines.len(),
        tokens,
        complexity,
        functions,
        classes,
        imports,
        has_main_guard,
        used_fallback_parser: true,
    }
}

fn count_line_tokens(line: &str) -> usize {
    line.split(|c: char| c.is_whitespace() || "()[]{}:,;.\"'".contains(c))
        .filter(|t| !t.is_empty())
        .count()
}

fn build_python_function(lines: &[&str], start_idx: usize, caps: &regex::Captures) -> FunctionDef {
    let indent = caps[1].len();
    let params: Vec<String> = caps[3]
        .split(',')
        .map(|p| p.split(':').next().unwrap_or("").split('=').next().unwrap_or("").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let end_idx = block_end_by_indent(lines, start_idx, indent);
    let body_lines = &lines[start_idx + 1..=end_idx.min(lines.len().saturating_sub(1))];
    let body_tokens: usize = body_lines.iter().map(|l| count_line_tokens(l)).sum();
    let signature_tokens = count_line_tokens(lines[start_idx]).max(1);
    let nesting_depth = body_lines
        .iter()
        .filter(|l| {
            let trimmed = l.trim_start();
            trimmed.starts_with("if ")
                || trimmed.starts_with("for ")
                || trimmed.starts_with("while ")
                || trimmed.starts_with("try")
                || trimmed.starts_with("with ")
        })
        .count()
        .min(6);

    FunctionDef {
        name: caps[2].to_string(),
        params,
        body_tokens,
        signature_tokens,
        nesting_depth,
        start_line: start_idx + 1,
        end_line: end_idx + 1,
        call_targets: None,
        decorators: leading_decorators(lines, start_idx, indent, "@"),
    }
}

fn build_python_class(caps: &regex::Captures) -> ClassDef {
    let bases: Vec<String> = caps
        .get(3)
        .map(|m| {
            m.as_str()
                .split(',')
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let is_abstract = bases.iter().any(|b| matches!(b.as_str(), "ABC" | "Protocol"));
    ClassDef {
        name: caps[2].to_string(),
        bases,
        methods: vec![],
        fields: vec![],
        is_abstract,
    }
}

fn build_clike_function(lines: &[&str], start_idx: usize, caps: &regex::Captures) -> FunctionDef {
    let params: Vec<String> = caps[2]
        .split(',')
        .map(|p| p.split(':').next().unwrap_or("").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let end_idx = block_end_by_braces(lines, start_idx);
    let body_lines = &lines[start_idx + 1..=end_idx.min(lines.len().saturating_sub(1))];
    let body_tokens: usize = body_lines.iter().map(|l| count_line_tokens(l)).sum();
    let signature_tokens = count_line_tokens(lines[start_idx]).max(1);
    let nesting_depth = body_lines
        .iter()
        .filter(|l| {
            let trimmed = l.trim_start();
            trimmed.starts_with("if ")
                || trimmed.starts_with("if(")
                || trimmed.starts_with("for ")
                || trimmed.starts_with("for(")
                || trimmed.starts_with("while ")
                || trimmed.starts_with("match ")
                || trimmed.starts_with("switch")
        })
        .count()
        .min(6);

    FunctionDef {
        name: caps[1].to_string(),
        params,
        body_tokens,
        signature_tokens,
        nesting_depth,
        start_line: start_idx + 1,
        end_line: end_idx + 1,
        call_targets: None,
        decorators: vec![],
    }
}

/// Find the last line belonging to an indent-delimited block (Python).
fn block_end_by_indent(lines: &[&str], start_idx: usize, indent: usize) -> usize {
    let mut end = start_idx;
    for (offset, line) in lines.iter().enumerate().skip(start_idx + 1) {
        if line.trim().is_empty() {
            end = offset;
            continue;
        }
        let this_indent = line.len() - line.trim_start().len();
        if this_indent <= indent {
            break;
        }
        end = offset;
    }
    end
}

/// Find the last line belonging to a brace-delimited block (C-like).
fn block_end_by_braces(lines: &[&str], start_idx: usize) -> usize {
    let mut depth: i64 = 0;
    let mut seen_open = false;
    let mut end = start_idx;
    for (offset, line) in lines.iter().enumerate().skip(start_idx) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        end = offset;
        if seen_open && depth <= 0 {
            break;
        }
    }
    end
}

fn leading_decorators(lines: &[&str], start_idx: usize, indent: usize, marker: &str) -> Vec<String> {
    let mut decorators = Vec::new();
    let mut idx = start_idx;
    while idx > 0 {
        idx -= 1;
        let line = lines[idx];
        let trimmed = line.trim_start();
        let this_indent = line.len() - trimmed.len();
        if trimmed.is_empty() {
            continue;
        }
        if this_indent == indent && trimmed.starts_with(marker) {
            decorators.push(trimmed.to_string());
        } else {
            break;
        }
    }
    decorators.reverse();
    decorators
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_on_python_without_a_grammar() {
        let source = "import os\n\ndef helper(x):\n    if x:\n        return x\n    return 0\n";
        let syntax = extract("m.py", "py", source);
        assert!(syntax.used_fallback_parser);
        assert_eq!(syntax.imports.len(), 1);
        assert_eq!(syntax.functions.len(), 1);
        assert!(syntax.functions[0].call_targets.is_none());
    }

    #[test]
    fn falls_back_on_clike_function() {
        let source = "func main() {\n    doWork()\n}\n";
        let syntax = extract("m.go", "go", source);
        assert_eq!(syntax.functions.len(), 1);
        assert!(syntax.has_main_guard);
    }

    #[test]
    fn decorators_are_collected_above_python_functions() {
        let source = "@app.route(\"/x\")\ndef handler():\n    return 1\n";
        let syntax = extract("m.py", "py", source);
        assert_eq!(syntax.functions[0].decorators.len(), 1);
    }
}
