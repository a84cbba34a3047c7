use crate::heuristics::Role;
use serde::{Deserialize, Serialize};

/// Latest metrics for one source, keyed by the hash of its path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedAnalysis {
    pub source: String,
    pub loc: usize,
    pub complexity: f64,
    pub class_count: usize,
    pub function_count: usize,
    pub role: Role,
    pub health_score: f64,
    pub risk_score: Option<f64>,
    pub updated_ms: u64,
}

impl PersistedAnalysis {
    /// Debt weight used to rank offenders: loc + 50 × class count
    pub fn debt_score(&self) -> usize {
        crate::core::metrics::debt_score(self.loc, self.class_count)
    }
}

/// One point in a source's health time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub timestamp_ms: u64,
    pub loc: usize,
    pub complexity: f64,
    pub health_score: f64,
}

/// A logged engine call, searchable by keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub timestamp_ms: u64,
    pub operation: String,
    pub target: String,
    pub summary: String,
}

impl Interaction {
    pub fn new(operation: impl Into<String>, target: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            timestamp_ms: now_ms(),
            operation: operation.into(),
            target: target.into(),
            summary: summary.into(),
        }
    }

    pub(crate) fn matches(&self, needle: &str) -> bool {
        [&self.operation, &self.target, &self.summary]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
