//! Public API surface (§6): the single high-level entry point,
//! `analyze(root, settings) -> (Findings, SignalFieldSnapshot)`, plus the
//! thin external-collaborator contracts it drives.
//!
//! This module is the glue that wires the six components described in §2
//! into the dependency order from §2's data-flow diagram:
//!
//! ```text
//! discovery -> Syntax -> {Structural, Temporal, Semantic} -> Architecture
//!           -> Signal Fusion -> Pattern Executor
//! ```
//!
//! Every stage after discovery is infallible in the library sense: a
//! missing or broken input degrades the slots/patterns that depend on it
//! rather than aborting the run (§7). The only failures `analyze` itself
//! surfaces are input errors — an invalid root or invalid settings.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{info, instrument};

use crate::architecture::{ArchitectureAnalyzer, ArchitectureResult};
use crate::clones::CloneDetector;
use crate::core::blackboard::Slot;
use crate::core::discovery::{DiscoveredFile, FileSource, GitHistorySource, StaticGitHistorySource, WalkdirFileSource};
use crate::core::diagnostics::Diagnostics;
use crate::core::errors::Result;
use crate::core::invariant;
use crate::core::settings::Settings;
use crate::fusion::{FusionInput, SignalFusion};
use crate::model::{Finding, FileSemantics, FileSyntax, SignalField};
use crate::patterns::PatternExecutor;
use crate::semantic::SemanticAnalyzer;
use crate::structural::StructuralAnalyzer;
use crate::syntax::SyntaxExtractor;
use crate::temporal::{TemporalAnalyzer, TemporalResult};

/// The run's typed blackboard (§5, §9): each analyzer writes exactly one
/// slot, and every downstream read goes through `Slot::available`/
/// `Slot::value` rather than an implicit unwrap. `temporal` is the only
/// slot expected to go unfilled in ordinary operation — absent or
/// too-short git history fails it with a reason rather than leaving it
/// empty, so diagnostics can distinguish "never ran" from "ran and found
/// nothing to work with".
#[derive(Default)]
struct Blackboard {
    syntax: Slot<HashMap<String, FileSyntax>>,
    structural: Slot<crate::structural::StructuralResult>,
    temporal: Slot<TemporalResult>,
    semantics: Slot<HashMap<String, FileSemantics>>,
    architecture: Slot<ArchitectureResult>,
}

/// Normalized-compression-distance threshold below which a file pair is
/// reported as a clone candidate (§4.6.5: `COPY_PASTE_CLONE` condition).
const CLONE_NCD_THRESHOLD: f64 = 0.3;

/// Ordered sequence of [`Finding`]s, ranked severity-descending (§3, §6).
pub type Findings = Vec<Finding>;

/// A serializable dump of the fused [`SignalField`] plus the run's
/// [`Diagnostics`] (§6: "stable field layout across runs").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignalFieldSnapshot {
    /// The fused signal field itself.
    pub field: SignalField,
    /// Self-diagnostic report for this run (§7 surfacing policy, §10.2).
    pub diagnostics: Diagnostics,
    /// Number of files that made it into the syntax slot (i.e. were both
    /// discovered and recognized as a supported language).
    pub file_count: usize,
    /// Whether the Temporal Analyzer's slot was populated this run.
    pub temporal_available: bool,
}

/// Combined result of [`analyze`]: the ranked findings plus the snapshot
/// they were derived from.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Ranked, deduplicated findings (§4.6.6).
    pub findings: Findings,
    /// The fused signal field this run produced, plus diagnostics.
    pub snapshot: SignalFieldSnapshot,
}

/// Analyze the codebase rooted at `root` using the default external
/// collaborators: a [`WalkdirFileSource`] for discovery and no git history
/// (subprocess invocation is out of scope per §1/§10.5).
///
/// Most callers that do have commit history available should use
/// [`analyze_with`] and supply a [`GitHistorySource`] (e.g.
/// [`StaticGitHistorySource`]) instead.
pub fn analyze(root: &Path, settings: &Settings) -> Result<AnalysisOutput> {
    analyze_with(root, settings, &WalkdirFileSource, &StaticGitHistorySource::empty())
}

/// Analyze the codebase rooted at `root`, with explicit file-discovery and
/// git-history collaborators (§6, item 1-2). This is the seam integration
/// tests and alternate front-ends (CI wrappers, language-server hosts)
/// should use.
#[instrument(skip(settings, file_source, git_source))]
pub fn analyze_with(
    root: &Path,
    settings: &Settings,
    file_source: &dyn FileSource,
    git_source: &dyn GitHistorySource,
) -> Result<AnalysisOutput> {
    settings.validate()?;

    let files = file_source.discover(root, settings)?;
    info!(file_count = files.len(), "discovered files");

    let mut diagnostics = Diagnostics::default();
    let mut board = Blackboard::default();

    // --- Syntax Extractor (§4.1) ---
    let workers = settings.effective_workers();
    let syntax_result = SyntaxExtractor.extract_all(&files, workers, &mut diagnostics);
    info!(parsed = syntax_result.len(), "parsed file syntax");
    board.syntax.set(syntax_result, "syntax");
    let syntax = board.syntax.value().expect("just set");

    // --- Structural, Temporal, Semantic analyzers run independently over
    // the same syntax slot (§2 data flow) ---
    board.structural.set(StructuralAnalyzer.analyze(syntax, settings), "structural");

    let commits = git_source.history(settings);
    match TemporalAnalyzer.analyze(commits.as_deref(), settings, &mut diagnostics) {
        Some(result) => board.temporal.set(result, "temporal"),
        None => board.temporal.fail("no commit history met the minimum-commits bar", "temporal"),
    }
    let temporal_available = board.temporal.available();

    board.semantics.set(SemanticAnalyzer.analyze(syntax), "semantic");

    // --- Architecture Analyzer reads structural + semantic output (§4.5) ---
    let structural = board.structural.value().expect("structural always fills its slot");
    let semantics = board.semantics.value().expect("semantic always fills its slot");
    board.architecture.set(
        ArchitectureAnalyzer.analyze(
            syntax,
            semantics,
            &structural.per_file,
            &structural.edges,
            settings.module_depth,
        ),
        "architecture",
    );

    // --- Clone detection: a thin, self-contained relation supplied
    // directly to the pattern layer (§9 design notes) ---
    let relevant_files: Vec<&DiscoveredFile> = files.iter().filter(|f| syntax.contains_key(&f.path)).collect();
    let owned_files: Vec<DiscoveredFile> = relevant_files.into_iter().cloned().collect();
    let clones = CloneDetector.detect(&owned_files, CLONE_NCD_THRESHOLD);

    // --- Signal Fusion (§4.6.1-4.6.3) ---
    let architecture = board.architecture.value().expect("architecture always fills its slot");
    let fusion_input = FusionInput {
        syntax,
        structural,
        temporal: board.temporal.value(),
        semantics,
        architecture,
        settings,
    };
    let fusion_result = SignalFusion.fuse(fusion_input, &mut diagnostics);

    let file_edges: HashSet<(String, String)> = structural
        .edges
        .iter()
        .map(|(a, b)| if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) })
        .collect();

    let co_change = board.temporal.value().map(|t| t.co_change.clone()).unwrap_or_default();
    let total_commits = board.temporal.value().map(|t| t.total_commits).unwrap_or(0);

    // --- Pattern Executor (§4.6.4-4.6.6) ---
    let findings = PatternExecutor::default().execute(
        &fusion_result.field,
        settings,
        &co_change,
        &clones,
        &fusion_result.module_authors,
        &fusion_result.module_edges,
        &fusion_result.module_file_counts,
        &file_edges,
        semantics,
        temporal_available,
        total_commits,
        &mut diagnostics,
    );

    // Invariant 1 (§3/§8): every finding's files must resolve to a known
    // entity. A violation is a programming error upstream; drop the
    // offending finding in release builds rather than shipping it (§7).
    let findings: Vec<Finding> = findings
        .into_iter()
        .filter(|finding| {
            finding.files.iter().all(|path| {
                let refers_to_known_entity = fusion_result.field.per_file.contains_key(path)
                    || fusion_result.field.per_module.contains_key(path);
                invariant::check(
                    refers_to_known_entity,
                    &format!("finding '{}' references unknown path '{}'", finding.pattern_name, path),
                )
            })
        })
        .collect();

    info!(findings = findings.len(), tier = ?fusion_result.field.tier, "analysis complete");

    Ok(AnalysisOutput {
        findings,
        snapshot: SignalFieldSnapshot {
            file_count: syntax.len(),
            temporal_available,
            field: fusion_result.field,
            diagnostics,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn analyze_runs_end_to_end_on_a_tiny_codebase() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "main.py", "if __name__ == '__main__':\n    pass\n");
        write_file(
            &dir,
            "util/helpers.py",
            "def helper():\n    return 1\n",
        );

        let settings = Settings::default();
        let output = analyze(dir.path(), &settings).expect("analysis should succeed");

        assert_eq!(output.snapshot.field.tier, crate::model::Tier::Absolute);
        assert!(output.snapshot.field.per_file.contains_key("main.py"));
        assert!(output.snapshot.field.per_file.contains_key("util/helpers.py"));
        // ORPHAN_CODE should fire on the unreferenced helper file.
        assert!(output.findings.iter().any(|f| f.pattern_name == "orphan_code"));
    }

    #[test]
    fn analyze_rejects_invalid_settings() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.max_findings = 0;
        let err = analyze(dir.path(), &settings).unwrap_err();
        assert!(matches!(err, crate::core::errors::CodeloomError::Validation { .. }));
    }
}
