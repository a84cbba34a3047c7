//! Results returned by the engine's operations.

use crate::heuristics::{Baseline, Role};
use crate::judgement::RefactorPlan;
use crate::risk::{Classification, RiskNode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub roots: Vec<PathBuf>,
    pub files_scanned: usize,
    pub total_loc: usize,
    pub updated_baseline: Baseline,
    /// Files that could not be read, with the reason
    pub unreadable: Vec<(String, String)>,
    pub cancelled: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnalysis {
    pub source: String,
    pub role: Role,
    pub judgement_summary: String,
    pub relative_complexity: f64,
    pub confidence: f64,
    pub risk_score: f64,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub per_file: Vec<FileAnalysis>,
    /// Smells across the scope, prefixed with their source
    pub smells: Vec<String>,
    pub health_score: f64,
    pub baseline: Baseline,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub nodes: BTreeMap<String, RiskNode>,
    /// False when version-control metrics fell back to zero
    pub history_available: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub source: String,
    pub plan: Option<RefactorPlan>,
    pub confidence: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blueprint {
    pub files: usize,
    pub functions: usize,
    pub classes: usize,
    pub edges: usize,
    /// Most depended-upon modules
    pub top_fan_in: Vec<(String, usize)>,
    pub roles: BTreeMap<Role, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    pub red_nodes: Vec<RiskNode>,
    pub health_score: f64,
    pub min_health: f64,
    pub passed: bool,
    /// Report only; never fails the build
    pub shadow: bool,
    pub warnings: Vec<String>,
}

impl GateReport {
    /// Whether the caller should exit non-zero
    pub fn blocks(&self) -> bool {
        !self.passed && !self.shadow
    }
}
