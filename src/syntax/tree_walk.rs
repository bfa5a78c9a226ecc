//! Generic tree-sitter walker shared by every supported language.
//!
//! One walker, parameterized by [`LangConfig`], recovers the
//! [`FileSyntax`] shape (§3) for every language in
//! [`crate::syntax::lang_config`]. This is the "structural parser" referred
//! to throughout §4.1.

use tree_sitter::{Node, Parser, Tree};

use crate::core::errors::{CodeloomError, Result};
use crate::model::{ClassDef, FileSyntax, FunctionDef, ImportDecl};

use super::lang_config::{self, LangConfig};

/// Parse `source` as `language_key` using the structural (tree-sitter)
/// path, producing a fully populated [`FileSyntax`].
pub fn extract(path: &str, language_key: &str, source: &str) -> Result<FileSyntax> {
    let config = lang_config::config_for(language_key)
        .ok_or_else(|| CodeloomError::unsupported_language(language_key))?;
    let language = lang_config::tree_sitter_language(language_key)
        .ok_or_else(|| CodeloomError::unsupported_language(language_key))?;

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| CodeloomError::parse(language_key, format!("grammar error: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| CodeloomError::parse_at(language_key, "parser produced no tree", path))?;

    Ok(build_file_syntax(path, language_key, source, config, &tree))
}

fn build_file_syntax(
    path: &str,
    language_key: &str,
    source: &str,
    config: &LangConfig,
    tree: &Tree,
) -> FileSyntax {
    let bytes = source.as_bytes();
    let root = tree.root_node();

    let mut functions = Vec::new();
    let mut classes = Vec::new();
    let mut imports = Vec::new();

    collect(root, bytes, config, &mut functions, &mut classes, &mut imports, path);

    let tokens = count_leaf_tokens(root);
    let complexity: usize = functions
        .iter()
        .map(|f| 1 + f.nesting_depth)
        .sum::<usize>()
        .max(functions.len());
    let has_main_guard = config
        .main_guard_markers
        .iter()
        .any(|marker| source.contains(marker));

    FileSyntax {
        path: path.to_string(),
        language: language_key.to_string(),
        mtime: None,
        lines: source.lines().count(),
        tokens,
        complexity,
        functions,
        classes,
        imports,
        has_main_guard,
        used_fallback_parser: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn collect(
    node: Node,
    bytes: &[u8],
    config: &LangConfig,
    functions: &mut Vec<FunctionDef>,
    classes: &mut Vec<ClassDef>,
    imports: &mut Vec<ImportDecl>,
    path: &str,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let kind = child.kind();
        if config.function_kinds.contains(&kind) {
            functions.push(extract_function(child, bytes, config));
            // Functions can nest (closures); keep walking inside the body.
            if let Some(body) = child.child_by_field_name("body") {
                collect(body, bytes, config, functions, classes, imports, path);
            }
            continue;
        }
        if config.class_kinds.contains(&kind) {
            classes.push(extract_class(child, bytes, config));
            if let Some(body) = child.child_by_field_name("body") {
                collect(body, bytes, config, functions, classes, imports, path);
            }
            continue;
        }
        if config.import_kinds.contains(&kind) {
            imports.push(extract_import(child, bytes, config));
            continue;
        }
        collect(child, bytes, config, functions, classes, imports, path);
    }
}

fn node_text<'a>(node: Node, bytes: &'a [u8]) -> &'a str {
    node.utf8_text(bytes).unwrap_or("")
}

fn extract_function(node: Node, bytes: &[u8], config: &LangConfig) -> FunctionDef {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, bytes).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());

    let params = node
        .child_by_field_name("parameters")
        .map(|p| collect_identifiers(p, bytes))
        .unwrap_or_default();

    let body_node = node.child_by_field_name("body");
    let body_tokens = body_node.map(count_leaf_tokens).unwrap_or(0);
    let total_tokens = count_leaf_tokens(node);
    let signature_tokens = total_tokens.saturating_sub(body_tokens).max(1);

    let nesting_depth = body_node
        .map(|b| max_nesting_depth(b, config.nesting_kinds))
        .unwrap_or(0);

    let call_targets = body_node.map(|b| collect_call_targets(b, bytes, config));

    let decorators = preceding_decorators(node, bytes, config);

    FunctionDef {
        name,
        params,
        body_tokens,
        signature_tokens,
        nesting_depth,
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        call_targets,
        decorators,
    }
}

fn extract_class(node: Node, bytes: &[u8], config: &LangConfig) -> ClassDef {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, bytes).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());

    let mut methods = Vec::new();
    let mut fields = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if config.function_kinds.contains(&child.kind()) {
                if let Some(n) = child.child_by_field_name("name") {
                    methods.push(node_text(n, bytes).to_string());
                }
            } else if child.kind().contains("field")
                || child.kind() == "assignment"
                || child.kind() == "variable_declarator"
            {
                fields.extend(collect_identifiers(child, bytes));
            }
        }
    }

    let full_text = node_text(node, bytes);
    let bases = extract_bases(full_text, &name);
    let is_abstract = config.abstract_class_kinds.contains(&node.kind())
        || bases
            .iter()
            .any(|b| matches!(b.as_str(), "ABC" | "Protocol" | "ABCMeta"));

    ClassDef {
        name,
        bases,
        methods,
        fields,
        is_abstract,
    }
}

/// Best-effort textual extraction of base-class / interface names from the
/// header line of a class-like declaration, avoiding reliance on a
/// grammar-specific "superclasses"/"heritage" field.
fn extract_bases(full_text: &str, name: &str) -> Vec<String> {
    let header = full_text.lines().next().unwrap_or("");
    let mut bases = Vec::new();
    for marker in ["(", "extends ", "implements ", ":"] {
        if let Some(idx) = header.find(marker) {
            let rest = &header[idx + marker.len()..];
            let rest = rest.split(['{', ')']).next().unwrap_or("");
            for part in rest.split(',') {
                let candidate = part.trim().trim_end_matches(')');
                if !candidate.is_empty()
                    && candidate != name
                    && candidate
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == ':')
                {
                    bases.push(candidate.trim_matches(':').to_string());
                }
            }
        }
    }
    bases
}

fn extract_import(node: Node, bytes: &[u8], config: &LangConfig) -> ImportDecl {
    let text = node_text(node, bytes).trim().trim_end_matches(';').to_string();

    // Prefer a quoted string literal (JS/TS/Go) as the import source.
    if let Some(quoted) = extract_quoted(&text) {
        return ImportDecl {
            source: quoted,
            names: extract_braced_names(&text),
            resolved_path: None,
        };
    }

    // Python: "import a.b.c" / "from a.b import c, d"
    let _ = config;
    if let Some(rest) = text.strip_prefix("from ") {
        let mut parts = rest.splitn(2, " import ");
        let module = parts.next().unwrap_or("").trim().to_string();
        let names = parts
            .next()
            .unwrap_or("")
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        return ImportDecl {
            source: module,
            names,
            resolved_path: None,
        };
    }
    if let Some(rest) = text.strip_prefix("import ") {
        return ImportDecl {
            source: rest.trim().to_string(),
            names: vec![],
            resolved_path: None,
        };
    }

    // Rust: "use a::b::{c, d};"
    if let Some(rest) = text.strip_prefix("use ") {
        let names = extract_braced_names(rest);
        let source = rest.split('{').next().unwrap_or(rest).trim_end_matches("::").to_string();
        return ImportDecl {
            source: source.trim().to_string(),
            names,
            resolved_path: None,
        };
    }

    ImportDecl {
        source: text,
        names: vec![],
        resolved_path: None,
    }
}

fn extract_quoted(text: &str) -> Option<String> {
    let start = text.find(['"', '\''])?;
    let quote = text.as_bytes()[start];
    let rest = &text[start + 1..];
    let end = rest.find(quote as char)?;
    Some(rest[..end].to_string())
}

fn extract_braced_names(text: &str) -> Vec<String> {
    let Some(open) = text.find('{') else {
        return Vec::new();
    };
    let Some(close) = text[open..].find('}') else {
        return Vec::new();
    };
    text[open + 1..open + close]
        .split(',')
        .map(|n| {
            n.trim()
                .split(" as ")
                .next()
                .unwrap_or("")
                .trim()
                .to_string()
        })
        .filter(|n| !n.is_empty())
        .collect()
}

fn preceding_decorators(node: Node, bytes: &[u8], config: &LangConfig) -> Vec<String> {
    if config.decorator_kinds.is_empty() {
        return Vec::new();
    }
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    let mut decorators = Vec::new();
    let mut cursor = parent.walk();
    let mut seen_self = false;
    let children: Vec<Node> = parent.children(&mut cursor).collect();
    for (idx, sibling) in children.iter().enumerate() {
        if sibling.id() == node.id() {
            seen_self = true;
            break;
        }
        let _ = idx;
    }
    if !seen_self {
        return decorators;
    }
    for sibling in children.iter().rev() {
        if sibling.id() == node.id() {
            continue;
        }
        if sibling.end_byte() > node.start_byte() {
            continue;
        }
        if config.decorator_kinds.contains(&sibling.kind()) {
            decorators.push(node_text(*sibling, bytes).trim().to_string());
        } else {
            break;
        }
    }
    decorators.reverse();
    decorators
}

fn collect_identifiers(node: Node, bytes: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    fn walk(node: Node, bytes: &[u8], names: &mut Vec<String>) {
        if node.kind() == "identifier" || node.kind() == "field_identifier" {
            names.push(node_text(node, bytes).to_string());
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            walk(child, bytes, names);
        }
    }
    for child in node.children(&mut cursor) {
        walk(child, bytes, &mut names);
    }
    names
}

fn collect_call_targets(node: Node, bytes: &[u8], config: &LangConfig) -> Vec<String> {
    let mut targets = Vec::new();
    walk_calls(node, bytes, config, &mut targets);
    targets
}

fn walk_calls(node: Node, bytes: &[u8], config: &LangConfig, targets: &mut Vec<String>) {
    if config.call_kinds.contains(&node.kind()) {
        if let Some(callee) = node.child_by_field_name("function") {
            let text = node_text(callee, bytes);
            let simplified = text
                .rsplit(['.', ':'])
                .next()
                .unwrap_or(text)
                .trim()
                .to_string();
            if !simplified.is_empty() {
                targets.push(simplified);
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls(child, bytes, config, targets);
    }
}

fn max_nesting_depth(node: Node, nesting_kinds: &[&str]) -> usize {
    let mut cursor = node.walk();
    let own = usize::from(nesting_kinds.contains(&node.kind()));
    let children_max = node
        .children(&mut cursor)
        .map(|c| max_nesting_depth(c, nesting_kinds))
        .max()
        .unwrap_or(0);
    own + children_max
}

fn count_leaf_tokens(node: Node) -> usize {
    if node.child_count() == 0 {
        return 1;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).map(count_leaf_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_python_function_and_import() {
        let source = r#"
import os

def helper(x, y):
    if x > 0:
        return x + y
    return y

class Widget(Base):
    def render(self):
        return helper(1, 2)
"#;
        let syntax = extract("widget.py", "py", source).unwrap();
        assert_eq!(syntax.language, "py");
        assert_eq!(syntax.imports.len(), 1);
        assert_eq!(syntax.imports[0].source, "os");

        let helper = syntax.functions.iter().find(|f| f.name == "helper").unwrap();
        assert_eq!(helper.nesting_depth, 1);
        assert!(helper.body_tokens > 0);

        let widget = syntax.classes.iter().find(|c| c.name == "Widget").unwrap();
        assert_eq!(widget.bases, vec!["Base".to_string()]);
        assert!(widget.methods.contains(&"render".to_string()));
    }

    #[test]
    fn extracts_rust_function_call_targets() {
        let source = r#"
fn helper() -> i32 { 42 }

fn caller() -> i32 {
    helper()
}
"#;
        let syntax = extract("lib.rs", "rs", source).unwrap();
        let caller = syntax.functions.iter().find(|f| f.name == "caller").unwrap();
        assert_eq!(caller.call_targets.as_deref(), Some(&["helper".to_string()][..]));
    }

    #[test]
    fn detects_main_guard() {
        let source = "if __name__ == \"__main__\":\n    run()\n";
        let syntax = extract("app.py", "py", source).unwrap();
        assert!(syntax.has_main_guard);
    }
}
