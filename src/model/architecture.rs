//! Architecture-level signal types produced by the Architecture Analyzer
//! (§3, §4.5).

use serde::{Deserialize, Serialize};

/// Rule-based dominant-role classification for a module, derived from the
/// aggregate of its files' [`crate::model::FileRole`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleRole {
    /// Mostly entry-point files.
    Entry,
    /// Mostly service/business-logic files.
    Service,
    /// Mostly data-model files.
    Model,
    /// Mixed or unclassifiable composition.
    Mixed,
}

impl Default for ModuleRole {
    fn default() -> Self {
        Self::Mixed
    }
}

/// Martin package metrics and derived signals for one directory-derived
/// module (§3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Number of files aggregated into this module.
    pub file_count: usize,
    /// Internal cohesion (share of same-community files).
    pub cohesion: f64,
    /// External coupling (internal/external edge ratio).
    pub coupling: f64,
    /// Afferent coupling: edges from *other* modules into this one.
    pub afferent_coupling: usize,
    /// Efferent coupling: edges from this module out to others.
    pub efferent_coupling: usize,
    /// Instability `Ce / (Ca + Ce)`; `None` when `Ca == Ce == 0`.
    ///
    /// Every consumer of this field must guard against `None` explicitly
    /// (§4.5, invariant 2): no pattern may read it as a bare number.
    pub instability: Option<f64>,
    /// Abstractness: fraction of files that are interfaces/traits/ABCs.
    pub abstractness: f64,
    /// Distance from the main sequence, `|A + I - 1|`; `None` when `I` is.
    pub main_sequence_distance: Option<f64>,
    /// Dominant role among this module's files.
    pub dominant_role: ModuleRole,
    /// How well this module's directory boundary matches its community
    /// partition (`1.0` = perfect alignment).
    pub boundary_alignment: f64,
    /// Topological layer depth (`None` when no clear layering exists).
    pub layer: Option<usize>,
}

/// A detected architectural layering violation (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerViolationKind {
    /// Edge points from a lower layer to a higher one.
    Backward,
    /// Edge skips more than one layer.
    Skip,
}

/// An edge between two modules that violates the derived layering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerViolation {
    /// Module the edge originates from.
    pub source_module: String,
    /// Module the edge points to.
    pub target_module: String,
    /// Layer depth of the source module.
    pub source_layer: usize,
    /// Layer depth of the target module.
    pub target_layer: usize,
    /// Kind of violation.
    pub violation_type: LayerViolationKind,
    /// Number of file-level edges contributing to this violation.
    pub edge_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_module_role_is_mixed() {
        assert_eq!(ModuleRole::default(), ModuleRole::Mixed);
    }
}
