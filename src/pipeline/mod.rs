//! Orchestration of the analysis pipeline.
//!
//! The [`Engine`] owns the session corpus and the optional persistent store,
//! and exposes every operation the CLI offers. Results are plain data types
//! from [`data`] so callers can render them however they like.

pub mod data;
pub mod engine;

pub use data::{
    AnalysisReport, Blueprint, FileAnalysis, GateReport, IngestReport, PlanOutcome, RiskReport,
};
pub use engine::Engine;
