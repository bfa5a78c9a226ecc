//! End-to-end seed scenarios (§8): concrete runs of [`codeloom::analyze`]
//! against small in-memory fixtures, each exercising one of the quantified
//! invariants or laws from the testable-properties section.
//!
//! Fixtures are handed to the pipeline through an in-memory [`FileSource`]
//! and, where commit history matters, a [`StaticGitHistorySource`] — no
//! real filesystem walk is needed since file content is a typed input.

use std::path::{Path, PathBuf};

use codeloom::api::analyze_with;
use codeloom::core::discovery::{DiscoveredFile, FileSource, GitHistorySource, StaticGitHistorySource};
use codeloom::core::errors::Result;
use codeloom::core::settings::Settings;
use codeloom::model::{CommitRecord, Tier};

struct FixedFileSource(Vec<DiscoveredFile>);

impl FileSource for FixedFileSource {
    fn discover(&self, _root: &Path, _settings: &Settings) -> Result<Vec<DiscoveredFile>> {
        Ok(self.0.clone())
    }
}

fn file(path: &str, content: &str) -> DiscoveredFile {
    DiscoveredFile {
        path: path.to_string(),
        absolute_path: PathBuf::from(path),
        content: content.to_string(),
    }
}

fn commit(hash: &str, ts: i64, author: &str, message: &str, files: &[&str]) -> CommitRecord {
    CommitRecord {
        hash: hash.to_string(),
        timestamp: ts,
        author: author.to_string(),
        message: message.to_string(),
        files: files.iter().map(|f| f.to_string()).collect(),
    }
}

/// Scenario 1 (§8): an unreferenced, non-entry file with no test-path
/// markers gets exactly one `ORPHAN_CODE` finding at severity 0.55
/// (invariant 1: every finding's files resolve in the signal field).
#[test]
fn orphan_file_gets_a_single_finding() {
    let files = vec![
        file(
            "main.py",
            "import a\nimport b\nimport c\n\nif __name__ == '__main__':\n    a.run()\n",
        ),
        file("a.py", "def helper_a():\n    return 1\n"),
        file("b.py", "def helper_b():\n    return 1\n"),
        file("c.py", "def helper_c():\n    return 1\n"),
        file(
            "util/helpers.py",
            "def helper():\n    return 1\n",
        ),
    ];

    let settings = Settings::default();
    let source = FixedFileSource(files);
    let output = analyze_with(Path::new("."), &settings, &source, &StaticGitHistorySource::empty())
        .expect("analysis should succeed");

    assert!(output.snapshot.field.per_file.contains_key("util/helpers.py"));

    let orphans: Vec<_> = output
        .findings
        .iter()
        .filter(|f| f.pattern_name == "orphan_code")
        .collect();
    assert_eq!(orphans.len(), 1, "expected exactly one orphan_code finding, got {orphans:?}");
    assert_eq!(orphans[0].files, vec!["util/helpers.py".to_string()]);
    assert!((orphans[0].severity - 0.55).abs() < 1e-9);

    for finding in &output.findings {
        for path in &finding.files {
            assert!(
                output.snapshot.field.per_file.contains_key(path) || output.snapshot.field.per_module.contains_key(path),
                "finding {} references unknown entity {path}",
                finding.pattern_name
            );
        }
    }
}

/// Scenario 2 (§8): a large fan-in hub concentrates almost all PageRank
/// mass, so every leaf's normalized PageRank share is forced under the
/// absolute floor (0.005) no matter how the leaves rank relative to each
/// other (invariant 2: `percentile(x) == 0` whenever `raw(x) < floor`).
#[test]
fn pagerank_floor_zeroes_percentile_for_low_importance_leaves() {
    const LEAF_COUNT: usize = 300;

    let mut files = vec![file("hub.py", "def entry():\n    return 1\n")];
    for i in 0..LEAF_COUNT {
        files.push(file(
            &format!("leaf{i}.py"),
            &format!("from hub import entry\n\ndef leaf_fn_{i}():\n    return entry()\n"),
        ));
    }

    let settings = Settings::default();
    let source = FixedFileSource(files);
    let output = analyze_with(Path::new("."), &settings, &source, &StaticGitHistorySource::empty())
        .expect("analysis should succeed");

    assert_eq!(output.snapshot.field.tier, Tier::Full);

    let floor = settings.signal_floors.pagerank;
    let mut checked = 0;
    for i in 0..LEAF_COUNT {
        let path = format!("leaf{i}.py");
        let signals = &output.snapshot.field.per_file[&path];
        assert!(
            signals.pagerank < floor,
            "leaf {path} unexpectedly cleared the pagerank floor: {}",
            signals.pagerank
        );
        let pctl = signals.percentiles.get("pagerank").copied().unwrap_or(-1.0);
        assert_eq!(pctl, 0.0, "leaf {path} should have a floored (zero) pagerank percentile, got {pctl}");
        checked += 1;
    }
    assert_eq!(checked, LEAF_COUNT);

    // The hub itself, by contrast, clears the floor comfortably.
    let hub = &output.snapshot.field.per_file["hub.py"];
    assert!(hub.pagerank >= floor);
}

/// Scenario 3 (§8): with almost every file untouched, the hotspot median
/// is dragged down near zero and only the genuinely hot, fix-heavy,
/// structurally central file clears the gate and produces `BUG_ATTRACTOR`.
#[test]
fn hotspot_gate_admits_only_the_actually_hot_central_file() {
    const COLD_COUNT: usize = 97;

    let mut files = vec![file("hot.py", "def entry():\n    return 1\n"), file("warm.py", "def w():\n    return 2\n")];
    for i in 0..COLD_COUNT {
        files.push(file(
            &format!("cold{i}.py"),
            &format!("from hot import entry\n\ndef cold_fn_{i}():\n    return entry()\n"),
        ));
    }

    let mut commits = Vec::new();
    let mut ts = 1_700_000_000;
    for i in 0..50 {
        let message = if i % 10 < 6 { "fix: squash a bug" } else { "update docs" };
        commits.push(commit(&format!("hot-{i}"), ts, "alice", message, &["hot.py"]));
        ts += 3600;
    }
    for i in 0..2 {
        commits.push(commit(&format!("warm-{i}"), ts, "alice", "tweak warm", &["warm.py"]));
        ts += 3600;
    }

    let settings = Settings::default();
    let source = FixedFileSource(files);
    let git = StaticGitHistorySource::new(commits);
    let output = analyze_with(Path::new("."), &settings, &source, &git).expect("analysis should succeed");

    assert_eq!(output.snapshot.field.tier, Tier::Full);
    assert!(output.snapshot.temporal_available);

    let hot = &output.snapshot.field.per_file["hot.py"];
    assert_eq!(hot.total_changes, Some(50));
    assert!((hot.fix_ratio.unwrap() - 0.6).abs() < 1e-9);
    assert!(hot.percentiles["pagerank"] > 0.80, "hub should be near top pagerank percentile");

    let attractors: Vec<_> = output.findings.iter().filter(|f| f.pattern_name == "bug_attractor").collect();
    assert_eq!(attractors.len(), 1);
    assert_eq!(attractors[0].files, vec!["hot.py".to_string()]);

    assert!(
        !output.findings.iter().any(|f| f.pattern_name == "bug_attractor" && f.files[0] == "warm.py"),
        "a barely-touched file must not pass the hotspot gate"
    );
}

/// Scenario 4 (§8): a four-layer module chain (`api -> service -> util ->
/// data`) plus a single edge that skips straight from `api` to `data`
/// produces exactly one `LAYER_VIOLATION` finding naming the two modules.
#[test]
fn layer_skip_produces_a_single_layer_violation() {
    const PER_MODULE: usize = 5;
    let mut files = Vec::new();

    for i in 0..PER_MODULE {
        let extra_import = if i == 0 { "\nimport data.d0\n" } else { "" };
        files.push(file(
            &format!("api/a{i}.py"),
            &format!("import service.s{i}{extra_import}\n\ndef api_fn_{i}():\n    return 1\n"),
        ));
        files.push(file(
            &format!("service/s{i}.py"),
            &format!("import util.u{i}\n\ndef service_fn_{i}():\n    return 1\n"),
        ));
        files.push(file(
            &format!("util/u{i}.py"),
            &format!("import data.d{i}\n\ndef util_fn_{i}():\n    return 1\n"),
        ));
        files.push(file(&format!("data/d{i}.py"), &format!("def data_fn_{i}():\n    return 1\n")));
    }

    let settings = Settings::default();
    let source = FixedFileSource(files);
    let output = analyze_with(Path::new("."), &settings, &source, &StaticGitHistorySource::empty())
        .expect("analysis should succeed");

    assert_eq!(output.snapshot.field.per_file.len(), PER_MODULE * 4);
    assert!(output.snapshot.field.tier.rank() >= Tier::Bayesian.rank());

    assert_eq!(output.snapshot.field.layer_violations.len(), 1);
    let violation = &output.snapshot.field.layer_violations[0];
    assert_eq!(violation.source_module, "api");
    assert_eq!(violation.target_module, "data");

    let findings: Vec<_> = output.findings.iter().filter(|f| f.pattern_name == "layer_violation").collect();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].files, vec!["api".to_string(), "data".to_string()]);
    assert!((findings[0].severity - 0.52).abs() < 1e-9);
}

/// Scenario 5 (§8): a single-author, highly central file with scattered,
/// high-volume function names simultaneously satisfies `god_file` and
/// `knowledge_silo` — the subsumption table keeps `god_file` only
/// (the subsumption-soundness law).
#[test]
fn god_file_subsumes_knowledge_silo_on_the_same_file() {
    const LEAF_COUNT: usize = 19;
    const FUNCTION_NAMES: &[&str] = &[
        "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet", "kilo", "lima",
        "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    ];

    let mut hub_src = String::new();
    for name in FUNCTION_NAMES {
        hub_src.push_str(&format!(
            "def {name}(p_{name}, q_{name}):\n    total = p_{name} + q_{name}\n    for i in range(total):\n        if i % 2 == 0:\n            total += i\n    return total\n\n"
        ));
    }

    let mut files = vec![file("hub.py", &hub_src)];
    for i in 0..LEAF_COUNT {
        files.push(file(
            &format!("leaf{i}.py"),
            &format!("from hub import alpha\n\ndef leaf_fn_{i}():\n    return alpha(1, 2)\n"),
        ));
    }

    let mut commits = Vec::new();
    let mut ts = 1_700_000_000;
    for i in 0..20 {
        commits.push(commit(&format!("hub-{i}"), ts, "alice", "touch hub", &["hub.py"]));
        ts += 3600;
    }
    commits.push(commit("warm-0", ts, "bob", "touch leaf0", &["leaf0.py"]));
    ts += 3600;
    commits.push(commit("warm-1", ts, "bob", "touch leaf0 again", &["leaf0.py"]));

    let settings = Settings::default();
    let source = FixedFileSource(files);
    let git = StaticGitHistorySource::new(commits);
    let output = analyze_with(Path::new("."), &settings, &source, &git).expect("analysis should succeed");

    assert_eq!(output.snapshot.field.tier, Tier::Bayesian);

    let hub = &output.snapshot.field.per_file["hub.py"];
    assert_eq!(hub.bus_factor, Some(1.0));
    assert!(hub.percentiles["cognitive_load"] >= 0.90);
    assert!(hub.percentiles["semantic_coherence"] <= 0.20);

    let god_file_hits: Vec<_> = output.findings.iter().filter(|f| f.pattern_name == "god_file" && f.files[0] == "hub.py").collect();
    assert_eq!(god_file_hits.len(), 1, "god_file should fire on the hub file");

    assert!(
        !output
            .findings
            .iter()
            .any(|f| f.pattern_name == "knowledge_silo" && f.files[0] == "hub.py"),
        "knowledge_silo must be subsumed by god_file on the same file"
    );
}

/// Scenario 6 (§8): a 10-file codebase sits at `ABSOLUTE` tier. Even a
/// maximally central, single-author hotspot must not trigger any
/// `BAYESIAN`-gated pattern (the tier-gating law), and `percentiles` stays
/// empty everywhere (invariant 7).
#[test]
fn absolute_tier_drops_bayesian_gated_patterns() {
    const LEAF_COUNT: usize = 9;

    let mut files = vec![file("hub.py", "def entry():\n    return 1\n")];
    for i in 0..LEAF_COUNT {
        files.push(file(
            &format!("leaf{i}.py"),
            &format!("from hub import entry\n\ndef leaf_fn_{i}():\n    return entry()\n"),
        ));
    }

    let mut commits = Vec::new();
    let mut ts = 1_700_000_000;
    for i in 0..20 {
        let message = if i % 2 == 0 { "fix: bug" } else { "patch" };
        commits.push(commit(&format!("hub-{i}"), ts, "alice", message, &["hub.py"]));
        ts += 3600;
    }

    let settings = Settings::default();
    let source = FixedFileSource(files);
    let git = StaticGitHistorySource::new(commits);
    let output = analyze_with(Path::new("."), &settings, &source, &git).expect("analysis should succeed");

    assert_eq!(output.snapshot.field.tier, Tier::Absolute);
    assert!(output.snapshot.field.per_file.values().all(|f| f.percentiles.is_empty()));

    const BAYESIAN_GATED: &[&str] = &[
        "knowledge_silo",
        "bug_attractor",
        "review_blindspot",
        "weak_link",
        "high_risk_hub",
        "truck_factor",
    ];
    for pattern in BAYESIAN_GATED {
        assert!(
            !output.findings.iter().any(|f| f.pattern_name == *pattern),
            "{pattern} must not fire below the Bayesian tier floor"
        );
    }
}
