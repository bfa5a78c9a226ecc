//! # codeloom
//!
//! Multi-phase static analysis kernel that fuses structural, temporal,
//! semantic, and architectural signals into ranked code-quality findings.
//!
//! The core is a linear pipeline over a shared typed blackboard: the
//! Syntax Extractor parses every discovered file, the Structural,
//! Temporal, and Semantic analyzers each read that syntax independently,
//! the Architecture Analyzer aggregates files into modules, Signal Fusion
//! unifies everything into one [`model::SignalField`], and the Pattern
//! Executor evaluates a fixed registry of declarative detectors against
//! that field to produce ranked [`model::Finding`]s.
//!
//! ```text
//! Syntax -> {Structural, Temporal, Semantic} -> Architecture -> Fusion -> Patterns
//! ```
//!
//! The single entry point is [`api::analyze`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::module_name_repetitions)]

#[cfg(all(feature = "mimalloc", not(feature = "jemalloc")))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Public API surface: the [`api::analyze`] entry point and its inputs/outputs.
pub mod api;

/// Architecture Analyzer (§4.5): Martin metrics, layering, layer violations.
pub mod architecture;

/// Clone detection (§9): approximate NCD over raw file content.
pub mod clones;

/// Core abstractions shared by every analyzer: errors, settings, the typed
/// blackboard, diagnostics, discovery contracts, and small stats helpers.
pub mod core;

/// Signal Fusion (§4.6.1-4.6.3): tiering, percentile normalization, and the
/// composite risk/delta-h signals.
pub mod fusion;

/// Shared data model (§3): the types every analyzer reads or writes.
pub mod model;

/// Pattern Executor (§4.6.4-4.6.6): the declarative pattern registry,
/// execution, subsumption, and ranking.
pub mod patterns;

/// Semantic Analyzer (§4.4): concepts, coherence, naming drift, roles.
pub mod semantic;

/// Structural Analyzer (§4.2): import graph, PageRank, communities, cycles.
pub mod structural;

/// Syntax Extractor (§4.1): per-file AST summaries via tree-sitter or regex.
pub mod syntax;

/// Temporal Analyzer (§4.3): churn trajectories and co-change pairs.
pub mod temporal;

pub use api::{analyze, AnalysisOutput};
pub use core::errors::{CodeloomError, Result};
pub use core::settings::Settings;
pub use model::Finding;
