//! Data model shared by every analyzer (§3).
//!
//! These types are created once by the analyzer that owns them and never
//! mutated afterward — `FileSyntax` at parse time, graph/churn/semantic/
//! module summaries once per run, `SignalField` once at fusion, `Finding`s
//! once at pattern execution.

pub mod architecture;
pub mod finding;
pub mod graph;
pub mod semantic;
pub mod signal_field;
pub mod syntax;
pub mod temporal;

pub use architecture::{LayerViolation, LayerViolationKind, ModuleRole, ModuleSummary};
pub use finding::{Effort, Evidence, Finding, Scope};
pub use graph::GraphMetrics;
pub use semantic::{Concept, FileRole, FileSemantics};
pub use signal_field::{DirectorySignals, FileSignals, GlobalSignals, SignalField, Tier};
pub use syntax::{ClassDef, FileSyntax, FunctionDef, ImportDecl};
pub use temporal::{ChurnSeries, CoChangePair, CommitRecord, Trajectory};
