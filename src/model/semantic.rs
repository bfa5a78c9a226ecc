//! Semantic signal types produced by the Semantic Analyzer (§3, §4.4).

use serde::{Deserialize, Serialize};

/// A discovered topic/concept and its weight within a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    /// Topic label (the most frequent token in the prefix-cluster).
    pub topic: String,
    /// Frequency-based weight of this concept within the file.
    pub weight: f64,
}

/// Rule-based file role classification (§4.4, §11 supplement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileRole {
    /// Program/module entry point.
    Entry,
    /// Business-logic / service layer file.
    Service,
    /// Data model / schema file.
    Model,
    /// Shared base/abstract utility file.
    Base,
    /// Configuration file.
    Config,
    /// Test file.
    Test,
    /// Could not be classified with confidence.
    Unknown,
}

impl Default for FileRole {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Per-file semantic signals (§3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileSemantics {
    /// Discovered concepts, most heavily weighted first.
    pub concepts: Vec<Concept>,
    /// Number of distinct concepts discovered.
    pub concept_count: usize,
    /// Shannon entropy of concept weights.
    pub concept_entropy: f64,
    /// `1 - normalized cluster entropy`; `1` = focused, `0` = scattered.
    pub semantic_coherence: f64,
    /// `1 - Jaccard(filename_tokens, concept_topics)`.
    pub naming_drift: f64,
    /// Rule-based role classification.
    pub role: FileRole,
    /// Composite cognitive-load score, normalized to `[0, 1]`.
    pub cognitive_load: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_is_unknown() {
        assert_eq!(FileRole::default(), FileRole::Unknown);
    }
}
