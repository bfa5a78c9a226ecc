//! Temporal Analyzer (§4.3) — churn trajectories and co-change pairs
//! derived from commit history.
//!
//! The whole analyzer is optional: when history is unavailable or shorter
//! than [`crate::core::settings::GitSettings::min_commits`], it produces no
//! result at all and every downstream temporal field on
//! [`crate::model::FileSignals`] stays `None` rather than being synthesized
//! as zero (§8 law: absence is not a zero).

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::diagnostics::Diagnostics;
use crate::core::settings::Settings;
use crate::core::stats::{coefficient_of_variation, effective_count, linear_slope, otsu_threshold, shannon_entropy};
use crate::model::{ChurnSeries, CoChangePair, CommitRecord, Trajectory};

const TIME_WINDOWS: usize = 10;

static FIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(fix|fixes|fixed|bug|hotfix|patch)\b").unwrap());
static REFACTOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(refactor|cleanup|clean up|restructure|rewrite)\b").unwrap());

/// Full temporal analysis result, present only when history met the
/// minimum-commits bar.
pub struct TemporalResult {
    pub per_file: HashMap<String, ChurnSeries>,
    pub co_change: Vec<CoChangePair>,
    pub team_size: usize,
    pub total_commits: usize,
}

/// Computes churn trajectories and co-change pairs from commit history
/// (§4.3).
#[derive(Debug, Default)]
pub struct TemporalAnalyzer;

impl TemporalAnalyzer {
    pub fn analyze(
        &self,
        commits: Option<&[CommitRecord]>,
        settings: &Settings,
        diagnostics: &mut Diagnostics,
    ) -> Option<TemporalResult> {
        let commits = commits?;
        if commits.len() < settings.git.min_commits {
            diagnostics.record_missing_slot(
                "temporal",
                &format!(
                    "only {} commits available, need {}",
                    commits.len(),
                    settings.git.min_commits
                ),
            );
            return None;
        }

        let (min_ts, max_ts) = commits
            .iter()
            .map(|c| c.timestamp)
            .fold((i64::MAX, i64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));

        let noisy_count = commits
            .iter()
            .filter(|c| c.files.len() > settings.git.noisy_commit_file_threshold)
            .count();
        diagnostics.record_noisy_commit_rate(noisy_count as f64 / commits.len() as f64);

        let mut per_file_commits: HashMap<String, Vec<&CommitRecord>> = HashMap::new();
        let mut authors = HashSet::new();
        for commit in commits {
            authors.insert(commit.author.clone());
            for file in &commit.files {
                per_file_commits.entry(file.clone()).or_default().push(commit);
            }
        }

        let window_counts: HashMap<String, Vec<f64>> = per_file_commits
            .iter()
            .map(|(path, list)| (path.clone(), bucket_into_windows(list, min_ts, max_ts)))
            .collect();

        let all_slopes: Vec<f64> = window_counts.values().map(|w| linear_slope(w)).collect();
        let all_cvs: Vec<f64> = window_counts.values().map(|w| coefficient_of_variation(w)).collect();
        let slope_threshold = otsu_threshold(&all_slopes).unwrap_or(0.0).abs();
        let cv_threshold = otsu_threshold(&all_cvs).unwrap_or_else(|| crate::core::stats::median(&all_cvs));

        let mut per_file = HashMap::with_capacity(per_file_commits.len());
        for (path, commit_list) in &per_file_commits {
            let windows = &window_counts[path];
            let slope = linear_slope(windows);
            let cv = coefficient_of_variation(windows);
            let trajectory = classify_trajectory(windows, slope, cv, slope_threshold, cv_threshold);

            let mut author_counts: HashMap<&str, f64> = HashMap::new();
            let mut fix_count = 0usize;
            let mut refactor_count = 0usize;
            for commit in commit_list {
                *author_counts.entry(commit.author.as_str()).or_insert(0.0) += 1.0;
                if FIX_PATTERN.is_match(&commit.message) {
                    fix_count += 1;
                }
                if REFACTOR_PATTERN.is_match(&commit.message) {
                    refactor_count += 1;
                }
            }
            let counts: Vec<f64> = author_counts.values().copied().collect();
            let authors: std::collections::BTreeSet<String> =
                author_counts.keys().map(|a| a.to_string()).collect();
            let total_changes = commit_list.len();

            per_file.insert(
                path.clone(),
                ChurnSeries {
                    total_changes,
                    trajectory,
                    slope,
                    cv,
                    bus_factor: effective_count(&counts),
                    author_entropy: shannon_entropy(&counts),
                    fix_ratio: fix_count as f64 / total_changes as f64,
                    refactor_ratio: refactor_count as f64 / total_changes as f64,
                    authors,
                },
            );
        }

        let co_change = compute_co_change(commits, settings);

        Some(TemporalResult {
            per_file,
            co_change,
            team_size: authors.len(),
            total_commits: commits.len(),
        })
    }
}

fn bucket_into_windows(commits: &[&CommitRecord], min_ts: i64, max_ts: i64) -> Vec<f64> {
    let span = (max_ts - min_ts).max(1) as f64;
    let mut buckets = vec![0.0; TIME_WINDOWS];
    for commit in commits {
        let position = (commit.timestamp - min_ts) as f64 / span;
        let bucket = ((position * TIME_WINDOWS as f64) as usize).min(TIME_WINDOWS - 1);
        buckets[bucket] += 1.0;
    }
    buckets
}

fn classify_trajectory(
    windows: &[f64],
    slope: f64,
    cv: f64,
    slope_threshold: f64,
    cv_threshold: f64,
) -> Trajectory {
    let recent_activity: f64 = windows[windows.len().saturating_sub(2)..].iter().sum();
    if recent_activity <= f64::EPSILON {
        return Trajectory::Dormant;
    }
    if slope > slope_threshold && cv > cv_threshold {
        Trajectory::Spiking
    } else if cv > cv_threshold {
        Trajectory::Churning
    } else if slope < -slope_threshold {
        Trajectory::Stabilizing
    } else {
        Trajectory::Stable
    }
}

fn compute_co_change(commits: &[CommitRecord], settings: &Settings) -> Vec<CoChangePair> {
    let relevant: Vec<&CommitRecord> = commits
        .iter()
        .filter(|c| c.files.len() <= settings.git.noisy_commit_file_threshold && c.files.len() >= 2)
        .collect();
    let total = relevant.len();
    if total == 0 {
        return Vec::new();
    }

    let mut file_counts: HashMap<&str, usize> = HashMap::new();
    let mut pair_counts: HashMap<(String, String), usize> = HashMap::new();

    for commit in &relevant {
        let mut files: Vec<&str> = commit.files.iter().map(|f| f.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        for file in &files {
            *file_counts.entry(file).or_insert(0) += 1;
        }
        for i in 0..files.len() {
            for j in (i + 1)..files.len() {
                let key = (files[i].to_string(), files[j].to_string());
                *pair_counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    let total_f = total as f64;
    let mut pairs = Vec::new();
    for ((file_a, file_b), &cochange_count) in &pair_counts {
        if cochange_count < settings.min_cochange_count {
            continue;
        }
        let count_a = *file_counts.get(file_a.as_str()).unwrap_or(&0) as f64;
        let count_b = *file_counts.get(file_b.as_str()).unwrap_or(&0) as f64;
        if count_a == 0.0 || count_b == 0.0 {
            continue;
        }
        let confidence_a_to_b = cochange_count as f64 / count_a;
        let confidence_b_to_a = cochange_count as f64 / count_b;
        let expected = (count_a / total_f) * (count_b / total_f);
        let lift = if expected > f64::EPSILON {
            (cochange_count as f64 / total_f) / expected
        } else {
            0.0
        };

        pairs.push(CoChangePair {
            file_a: file_a.clone(),
            file_b: file_b.clone(),
            cochange_count,
            confidence_a_to_b,
            confidence_b_to_a,
            lift,
        });
    }

    pairs.sort_by(|a, b| {
        b.cochange_count
            .cmp(&a.cochange_count)
            .then_with(|| a.file_a.cmp(&b.file_a))
            .then_with(|| a.file_b.cmp(&b.file_b))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, ts: i64, author: &str, message: &str, files: &[&str]) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            timestamp: ts,
            author: author.to_string(),
            message: message.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn commits_meeting_minimum() -> Vec<CommitRecord> {
        (0..12)
            .map(|i| commit(&format!("c{i}"), i * 1000, "alice", "fix bug", &["a.py", "b.py"]))
            .collect()
    }

    #[test]
    fn below_min_commits_returns_none() {
        let commits = vec![commit("c1", 0, "alice", "init", &["a.py"])];
        let mut diagnostics = Diagnostics::default();
        let result = TemporalAnalyzer.analyze(Some(&commits), &Settings::default(), &mut diagnostics);
        assert!(result.is_none());
    }

    #[test]
    fn co_change_pair_is_recorded_for_frequently_joint_files() {
        let commits = commits_meeting_minimum();
        let mut diagnostics = Diagnostics::default();
        let result = TemporalAnalyzer
            .analyze(Some(&commits), &Settings::default(), &mut diagnostics)
            .unwrap();
        assert_eq!(result.co_change.len(), 1);
        assert_eq!(result.co_change[0].cochange_count, 12);
        assert_eq!(result.team_size, 1);
    }

    #[test]
    fn fix_ratio_reflects_commit_message_classification() {
        let commits = commits_meeting_minimum();
        let mut diagnostics = Diagnostics::default();
        let result = TemporalAnalyzer
            .analyze(Some(&commits), &Settings::default(), &mut diagnostics)
            .unwrap();
        assert_eq!(result.per_file["a.py"].fix_ratio, 1.0);
    }

    #[test]
    fn noisy_bulk_commits_excluded_from_cochange() {
        let mut commits = commits_meeting_minimum();
        let bulk_files: Vec<String> = (0..40).map(|i| format!("f{i}.py")).collect();
        commits.push(CommitRecord {
            hash: "bulk".into(),
            timestamp: 99999,
            author: "bob".into(),
            message: "mass rename".into(),
            files: bulk_files,
        });
        let mut diagnostics = Diagnostics::default();
        let _ = TemporalAnalyzer
            .analyze(Some(&commits), &Settings::default(), &mut diagnostics)
            .unwrap();
        assert!(diagnostics.noisy_commit_rate > 0.0);
    }
}
