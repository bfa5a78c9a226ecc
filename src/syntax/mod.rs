//! Syntax Extractor (§4.1) — the first, leaf-level analyzer.
//!
//! Parses every discovered file into a [`FileSyntax`], preferring the
//! tree-sitter structural path ([`tree_walk`]) and falling back to
//! [`regex_fallback`] when no grammar is registered for the language or the
//! structural parse fails. Runs across a bounded worker pool (§10.1,
//! mirrors the teacher's rayon-based parallel analysis).

pub mod lang_config;
pub mod regex_fallback;
pub mod tree_walk;

use std::collections::HashMap;
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::diagnostics::Diagnostics;
use crate::core::discovery::DiscoveredFile;
use crate::model::FileSyntax;

/// Parses a codebase's discovered files into per-file [`FileSyntax`].
#[derive(Debug, Default)]
pub struct SyntaxExtractor;

impl SyntaxExtractor {
    /// Parse every file in `files`, recording fallback-rate diagnostics.
    ///
    /// Files whose extension matches no registered language are skipped
    /// entirely (they contribute to neither the structural nor the
    /// fallback count) — the blackboard simply has no `FileSyntax` entry
    /// for them, which every downstream analyzer must treat as a missing
    /// slot rather than an empty one.
    pub fn extract_all(
        &self,
        files: &[DiscoveredFile],
        workers: usize,
        diagnostics: &mut Diagnostics,
    ) -> HashMap<String, FileSyntax> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build();

        let fallback_count = Mutex::new(0usize);
        let parsed_count = Mutex::new(0usize);

        let results: Vec<(String, FileSyntax)> = match pool {
            Ok(pool) => pool.install(|| self.parse_parallel(files, &fallback_count, &parsed_count)),
            Err(e) => {
                warn!(error = %e, "failed to build worker pool, parsing sequentially");
                self.parse_parallel(files, &fallback_count, &parsed_count)
            }
        };

        let total_parsed = *parsed_count.lock().unwrap();
        let total_fallback = *fallback_count.lock().unwrap();
        let fallback_rate = if total_parsed == 0 {
            0.0
        } else {
            total_fallback as f64 / total_parsed as f64
        };
        diagnostics.record_fallback_rate(fallback_rate, true);

        results.into_iter().collect()
    }

    fn parse_parallel(
        &self,
        files: &[DiscoveredFile],
        fallback_count: &Mutex<usize>,
        parsed_count: &Mutex<usize>,
    ) -> Vec<(String, FileSyntax)> {
        files
            .par_iter()
            .filter_map(|file| {
                let language_key = detect_language(&file.path)?;
                *parsed_count.lock().unwrap() += 1;

                let syntax = match tree_walk::extract(&file.path, language_key, &file.content) {
                    Ok(syntax) => syntax,
                    Err(e) => {
                        debug!(path = %file.path, error = %e, "structural parse failed, using regex fallback");
                        *fallback_count.lock().unwrap() += 1;
                        regex_fallback::extract(&file.path, language_key, &file.content)
                    }
                };
                Some((file.path.clone(), syntax))
            })
            .collect()
    }
}

/// Resolve a language key from a file path's extension.
fn detect_language(path: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(path)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    lang_config::key_for_extension(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_string(),
            absolute_path: path.into(),
            content: content.to_string(),
        }
    }

    #[test]
    fn extracts_mixed_languages_and_skips_unknown_extensions() {
        let files = vec![
            file("a.py", "def f():\n    return 1\n"),
            file("b.rs", "fn f() -> i32 { 1 }\n"),
            file("notes.txt", "not code"),
        ];
        let mut diagnostics = Diagnostics::default();
        let extractor = SyntaxExtractor;
        let results = extractor.extract_all(&files, 2, &mut diagnostics);

        assert_eq!(results.len(), 2);
        assert!(results.contains_key("a.py"));
        assert!(results.contains_key("b.rs"));
        assert!(!results.contains_key("notes.txt"));
    }

    #[test]
    fn unknown_language_for_unrecognized_extension() {
        assert_eq!(detect_language("README.md"), None);
        assert_eq!(detect_language("main.rs"), Some("rs"));
    }
}
