//! Thin external-collaborator contracts (§6, §10.5).
//!
//! Directory walking and git-subprocess invocation are explicitly out of
//! scope for the analysis kernel; it consumes their outputs as typed
//! inputs. This module defines those contracts plus a minimal concrete
//! implementation of each, sufficient to drive the library end to end.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use tracing::{debug, warn};

use crate::core::errors::Result;
use crate::core::settings::Settings;
use crate::model::CommitRecord;

/// A single file handed to the kernel by a directory walker.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path relative to the codebase root, forward-slash separated.
    pub path: String,
    /// Absolute path on disk.
    pub absolute_path: PathBuf,
    /// File contents, UTF-8 (invalid bytes replaced per §6).
    pub content: String,
}

/// Contract for a directory-walking collaborator (§6, item 1).
pub trait FileSource {
    /// Discover files under `root` subject to `settings`.
    fn discover(&self, root: &Path, settings: &Settings) -> Result<Vec<DiscoveredFile>>;
}

/// Contract for a git-history collaborator (§6, item 2).
///
/// Returns `None` when no history is available; the Temporal Analyzer's
/// slot is then left empty rather than treated as an error (§4.3).
pub trait GitHistorySource {
    /// Fetch commit history relevant to the codebase under analysis.
    fn history(&self, settings: &Settings) -> Option<Vec<CommitRecord>>;
}

/// Default [`FileSource`] built on `walkdir` + `ignore` + `globset`,
/// enforcing the resource limits and path-safety rules from §5.
#[derive(Debug, Default)]
pub struct WalkdirFileSource;

impl FileSource for WalkdirFileSource {
    fn discover(&self, root: &Path, settings: &Settings) -> Result<Vec<DiscoveredFile>> {
        let root = root
            .canonicalize()
            .map_err(|e| crate::core::errors::CodeloomError::io(format!("{e}")))?;

        let mut exclude_builder = GlobSetBuilder::new();
        for pattern in &settings.limits.exclude_patterns {
            if let Ok(glob) = Glob::new(pattern) {
                exclude_builder.add(glob);
            }
        }
        let exclude_set = exclude_builder
            .build()
            .unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap());

        let max_bytes = settings.limits.max_file_size_mb.saturating_mul(1024 * 1024);

        let mut walker = walkdir::WalkDir::new(&root).follow_links(settings.limits.follow_symlinks);
        if !settings.limits.follow_symlinks {
            walker = walker.follow_links(false);
        }

        let mut discovered = Vec::new();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if discovered.len() >= settings.limits.max_files {
                warn!(
                    cap = settings.limits.max_files,
                    "file count cap reached, ignoring remaining files"
                );
                break;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let abs_path = entry.path();
            if !path_stays_within_root(&root, abs_path) {
                warn!(path = %abs_path.display(), "rejecting path escaping codebase root");
                continue;
            }

            let rel_path = match abs_path.strip_prefix(&root) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let rel_str = rel_path.to_string_lossy().replace('\\', "/");

            if !settings.limits.allow_hidden_files && is_hidden(rel_path) {
                continue;
            }
            if exclude_set.is_match(&rel_str) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };
            if metadata.len() > max_bytes {
                debug!(path = %rel_str, size = metadata.len(), "skipping oversized file");
                continue;
            }

            let bytes = match std::fs::read(abs_path) {
                Ok(b) => b,
                Err(e) => {
                    debug!(path = %rel_str, error = %e, "failed to read file, skipping");
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes).into_owned();

            discovered.push(DiscoveredFile {
                path: rel_str,
                absolute_path: abs_path.to_path_buf(),
                content,
            });
        }

        Ok(discovered)
    }
}

fn is_hidden(rel_path: &Path) -> bool {
    rel_path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn path_stays_within_root(root: &Path, candidate: &Path) -> bool {
    match candidate.canonicalize() {
        Ok(resolved) => resolved.starts_with(root),
        Err(_) => false,
    }
}

/// A [`GitHistorySource`] wrapping a pre-collected commit list, for
/// programmatic use and testing.
#[derive(Debug, Clone, Default)]
pub struct StaticGitHistorySource {
    commits: Option<Vec<CommitRecord>>,
}

impl StaticGitHistorySource {
    /// Wrap a concrete commit history.
    pub fn new(commits: Vec<CommitRecord>) -> Self {
        Self {
            commits: Some(commits),
        }
    }

    /// No history available.
    pub fn empty() -> Self {
        Self { commits: None }
    }
}

impl GitHistorySource for StaticGitHistorySource {
    fn history(&self, settings: &Settings) -> Option<Vec<CommitRecord>> {
        let commits = self.commits.clone()?;
        if commits.len() < settings.git.min_commits {
            return None;
        }
        let mut commits = commits;
        if commits.len() > settings.git.max_commits {
            commits.truncate(settings.git.max_commits);
        }
        Some(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walkdir_source_discovers_files_and_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/dep.js"), "ignored").unwrap();

        let settings = Settings::default();
        let source = WalkdirFileSource;
        let files = source.discover(dir.path(), &settings).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "main.py");
    }

    #[test]
    fn static_history_enforces_min_commits() {
        let settings = Settings::default();
        let source = StaticGitHistorySource::new(vec![]);
        assert!(source.history(&settings).is_none());
    }
}
