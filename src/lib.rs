//! fragmap: structural and fragility profiling for Python codebases.
//!
//! Source files are parsed into [`FactRecord`]s, linked into a
//! [`KnowledgeGraph`], interpreted against a corpus baseline, judged, and
//! scored for fragility. Results can be persisted to an embedded store and
//! mined for trends.

pub mod audit;
pub mod cli;
pub mod common;
pub mod comparison;
pub mod config;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod extraction;
pub mod graph;
pub mod heuristics;
pub mod io;
pub mod judgement;
pub mod pipeline;
pub mod policy;
pub mod risk;
pub mod store;

// Re-export commonly used types
pub use crate::core::{ClassFact, FactRecord, FunctionFact, NodeKind};
pub use crate::corpus::Corpus;
pub use crate::errors::{FragmapError, Result};
pub use crate::graph::{Edge, KnowledgeGraph, Relation};
pub use crate::heuristics::{Baseline, Interpretation, Role, Smell};
pub use crate::judgement::{Judgement, RefactorPlan};
pub use crate::pipeline::Engine;
pub use crate::policy::{PolicyGuard, PolicyReport, Violation};
pub use crate::risk::{Classification, RiskNode, RiskScorer};
pub use crate::store::KnowledgeStore;
