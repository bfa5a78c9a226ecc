//! Per-language node-kind tables used by the generic tree-sitter walker.
//!
//! Rather than a bespoke hand-written adapter per language (as the teacher
//! does for its much broader feature set), the extractor here is one
//! generic walker parameterized by a small table of tree-sitter node kinds
//! per language — enough to recover the [`crate::model::FileSyntax`] shape
//! §4.1 requires across five languages.

use tree_sitter::Language;

/// Node-kind table for one supported language.
pub struct LangConfig {
    /// Canonical language key (matches file extension detection).
    pub key: &'static str,
    /// File extensions (without leading dot) mapped to this language.
    pub extensions: &'static [&'static str],
    /// Node kinds that represent a function/method definition.
    pub function_kinds: &'static [&'static str],
    /// Node kinds that represent a class/struct/interface/trait definition.
    pub class_kinds: &'static [&'static str],
    /// Node kinds that mark a definition as abstract (interface/trait/ABC).
    pub abstract_class_kinds: &'static [&'static str],
    /// Node kinds that represent an import/use/require declaration.
    pub import_kinds: &'static [&'static str],
    /// Node kinds that represent a call expression.
    pub call_kinds: &'static [&'static str],
    /// Node kinds that add one level of nesting when counting depth.
    pub nesting_kinds: &'static [&'static str],
    /// Node kinds representing decorators/attributes.
    pub decorator_kinds: &'static [&'static str],
    /// Substrings whose presence in the source marks a main-guard /
    /// entry-point file.
    pub main_guard_markers: &'static [&'static str],
}

/// Resolve the tree-sitter grammar for a language key.
pub fn tree_sitter_language(key: &str) -> Option<Language> {
    match key {
        "py" => Some(tree_sitter_python::LANGUAGE.into()),
        "js" => Some(tree_sitter_javascript::LANGUAGE.into()),
        "ts" | "tsx" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "rs" => Some(tree_sitter_rust::LANGUAGE.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        _ => None,
    }
}

/// Resolve the node-kind table for a language key.
pub fn config_for(key: &str) -> Option<&'static LangConfig> {
    LANGUAGES.iter().find(|c| c.key == key)
}

/// Resolve a language key from a file extension.
pub fn key_for_extension(ext: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|c| c.extensions.contains(&ext))
        .map(|c| c.key)
}

static LANGUAGES: &[LangConfig] = &[
    LangConfig {
        key: "py",
        extensions: &["py", "pyi"],
        function_kinds: &["function_definition"],
        class_kinds: &["class_definition"],
        abstract_class_kinds: &[],
        import_kinds: &["import_statement", "import_from_statement"],
        call_kinds: &["call"],
        nesting_kinds: &[
            "if_statement",
            "for_statement",
            "while_statement",
            "try_statement",
            "with_statement",
        ],
        decorator_kinds: &["decorator"],
        main_guard_markers: &["if __name__ == \"__main__\"", "if __name__ == '__main__'"],
    },
    LangConfig {
        key: "js",
        extensions: &["js", "jsx", "mjs", "cjs"],
        function_kinds: &[
            "function_declaration",
            "method_definition",
            "arrow_function",
            "function_expression",
        ],
        class_kinds: &["class_declaration"],
        abstract_class_kinds: &[],
        import_kinds: &["import_statement"],
        call_kinds: &["call_expression"],
        nesting_kinds: &[
            "if_statement",
            "for_statement",
            "for_in_statement",
            "while_statement",
            "try_statement",
            "switch_statement",
        ],
        decorator_kinds: &["decorator"],
        main_guard_markers: &["require.main === module"],
    },
    LangConfig {
        key: "ts",
        extensions: &["ts", "tsx", "cts", "mts"],
        function_kinds: &[
            "function_declaration",
            "method_definition",
            "arrow_function",
            "function_expression",
        ],
        class_kinds: &["class_declaration", "interface_declaration"],
        abstract_class_kinds: &["interface_declaration"],
        import_kinds: &["import_statement"],
        call_kinds: &["call_expression"],
        nesting_kinds: &[
            "if_statement",
            "for_statement",
            "for_in_statement",
            "while_statement",
            "try_statement",
            "switch_statement",
        ],
        decorator_kinds: &["decorator"],
        main_guard_markers: &["require.main === module"],
    },
    LangConfig {
        key: "rs",
        extensions: &["rs"],
        function_kinds: &["function_item"],
        class_kinds: &["struct_item", "trait_item", "enum_item"],
        abstract_class_kinds: &["trait_item"],
        import_kinds: &["use_declaration"],
        call_kinds: &["call_expression"],
        nesting_kinds: &[
            "if_expression",
            "for_expression",
            "while_expression",
            "loop_expression",
            "match_expression",
        ],
        decorator_kinds: &["attribute_item"],
        main_guard_markers: &["fn main("],
    },
    LangConfig {
        key: "go",
        extensions: &["go"],
        function_kinds: &["function_declaration", "method_declaration"],
        class_kinds: &["type_declaration"],
        abstract_class_kinds: &[],
        import_kinds: &["import_declaration"],
        call_kinds: &["call_expression"],
        nesting_kinds: &["if_statement", "for_statement", "type_switch_statement"],
        decorator_kinds: &[],
        main_guard_markers: &["func main("],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_resolves_to_expected_language() {
        assert_eq!(key_for_extension("py"), Some("py"));
        assert_eq!(key_for_extension("tsx"), Some("ts"));
        assert_eq!(key_for_extension("rs"), Some("rs"));
        assert_eq!(key_for_extension("xyz"), None);
    }

    #[test]
    fn config_lookup_matches_key() {
        assert!(config_for("py").is_some());
        assert!(config_for("nope").is_none());
    }
}
