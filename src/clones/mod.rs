//! Clone detection — supplies the `{file_a, file_b, ncd}` contract consumed
//! directly by the `COPY_PASTE_CLONE` and `DUPLICATE_INCOMPLETE` patterns
//! (§9 design notes: NCD is out of scope beyond this contract).
//!
//! No compression crate is in the dependency stack, so Normalized
//! Compression Distance is approximated with a small hand-rolled LZW
//! encoder: `C(x)` is the number of codes LZW emits for `x`, a standard
//! proxy for Kolmogorov complexity when a real compressor isn't available.

use std::collections::HashMap;

use crate::core::discovery::DiscoveredFile;

/// An unordered file pair flagged as near-duplicate content.
#[derive(Debug, Clone)]
pub struct ClonePair {
    pub file_a: String,
    pub file_b: String,
    /// Normalized Compression Distance in `[0, 1]`; near `0` = near-duplicate.
    pub ncd: f64,
}

/// Maximum files compared pairwise; above this the detector still runs but
/// restricts comparisons to files within a narrow size band to keep the
/// (inherently O(n^2)) scan tractable.
const DENSE_COMPARISON_LIMIT: usize = 400;

/// Detects near-duplicate files via approximate NCD, pre-filtered to pairs
/// below `threshold` (§4.6.5: `NCD < 0.3`).
#[derive(Debug, Default)]
pub struct CloneDetector;

impl CloneDetector {
    pub fn detect(&self, files: &[DiscoveredFile], threshold: f64) -> Vec<ClonePair> {
        let compressed: HashMap<&str, usize> = files
            .iter()
            .map(|f| (f.path.as_str(), lzw_code_count(f.content.as_bytes())))
            .collect();

        let mut pairs = Vec::new();
        let dense = files.len() <= DENSE_COMPARISON_LIMIT;

        for i in 0..files.len() {
            for j in (i + 1)..files.len() {
                let a = &files[i];
                let b = &files[j];

                if !dense {
                    let (la, lb) = (a.content.len() as f64, b.content.len() as f64);
                    let ratio = if la > lb { la / lb.max(1.0) } else { lb / la.max(1.0) };
                    if ratio > 3.0 {
                        continue;
                    }
                }

                let ca = compressed[a.path.as_str()];
                let cb = compressed[b.path.as_str()];
                let cab = lzw_code_count_concat(a.content.as_bytes(), b.content.as_bytes());
                let ncd = normalized_compression_distance(ca, cb, cab);
                if ncd < threshold {
                    let (file_a, file_b) = if a.path <= b.path {
                        (a.path.clone(), b.path.clone())
                    } else {
                        (b.path.clone(), a.path.clone())
                    };
                    pairs.push(ClonePair { file_a, file_b, ncd });
                }
            }
        }

        pairs.sort_by(|a, b| {
            a.ncd
                .partial_cmp(&b.ncd)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.file_a.cmp(&b.file_a))
        });
        pairs
    }
}

/// `NCD(x, y) = (C(xy) - min(C(x), C(y))) / max(C(x), C(y))`, clamped to
/// `[0, 1]` (GLOSSARY).
fn normalized_compression_distance(c_x: usize, c_y: usize, c_xy: usize) -> f64 {
    let max_c = c_x.max(c_y) as f64;
    if max_c <= 0.0 {
        return 0.0;
    }
    let min_c = c_x.min(c_y) as f64;
    ((c_xy as f64 - min_c) / max_c).clamp(0.0, 1.0)
}

/// Number of codes a byte-oriented LZW encoder would emit for `data` — a
/// monotonic proxy for compressed size (more redundancy, fewer codes).
fn lzw_code_count(data: &[u8]) -> usize {
    if data.is_empty() {
        return 0;
    }
    let mut dictionary: HashMap<Vec<u8>, usize> =
        (0..=255usize).map(|b| (vec![b as u8], b)).collect();
    let mut next_code = 256usize;
    let mut count = 0usize;
    let mut current = Vec::with_capacity(2);

    for &byte in data {
        let mut candidate = current.clone();
        candidate.push(byte);
        if dictionary.contains_key(&candidate) {
            current = candidate;
        } else {
            count += 1;
            dictionary.insert(candidate, next_code);
            next_code += 1;
            current = vec![byte];
        }
    }
    if !current.is_empty() {
        count += 1;
    }
    count
}

fn lzw_code_count_concat(a: &[u8], b: &[u8]) -> usize {
    let mut combined = Vec::with_capacity(a.len() + b.len());
    combined.extend_from_slice(a);
    combined.extend_from_slice(b);
    lzw_code_count(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_string(),
            absolute_path: std::path::PathBuf::from(path),
            content: content.to_string(),
        }
    }

    #[test]
    fn identical_files_have_near_zero_ncd() {
        let body = "def handler(request):\n    return process(request)\n".repeat(20);
        let files = vec![file("a.py", &body), file("b.py", &body)];
        let pairs = CloneDetector.detect(&files, 0.3);
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].ncd < 0.05);
    }

    #[test]
    fn unrelated_files_are_not_flagged_as_clones() {
        let files = vec![
            file("a.py", &"def alpha(): return 1\n".repeat(30)),
            file(
                "b.py",
                &"class Gateway:\n    def route(self, req):\n        pass\n".repeat(30),
            ),
        ];
        let pairs = CloneDetector.detect(&files, 0.3);
        assert!(pairs.is_empty());
    }

    #[test]
    fn file_pair_is_reported_in_lexicographic_order() {
        let body = "x = 1\n".repeat(10);
        let files = vec![file("z.py", &body), file("a.py", &body)];
        let pairs = CloneDetector.detect(&files, 0.5);
        assert_eq!(pairs[0].file_a, "a.py");
        assert_eq!(pairs[0].file_b, "z.py");
    }
}
