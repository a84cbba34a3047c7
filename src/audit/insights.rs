//! Executive summary over every stored analysis.

use crate::core::metrics;
use crate::errors::Result;
use crate::risk::{nodes_in, Classification, RiskNode};
use crate::store::{KnowledgeStore, PersistedAnalysis};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Debt score units per debt point
const DEBT_POINT_UNITS: f64 = 100.0;
/// Estimated refactor cost per debt point
const COST_PER_POINT: f64 = 150.0;
const HEALTH_DIVISOR: f64 = 10.0;
const VELOCITY_RISK_DEBT: f64 = 500.0;
const CRITICAL_DEBT: f64 = 1000.0;
const SMALL_CORPUS_UNITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VelocityRisk {
    High,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    EnterpriseReady,
    Transitional,
    DebtHeavy,
}

impl Verdict {
    pub fn from_debt(debt_points: f64) -> Self {
        if debt_points < 500.0 {
            Verdict::EnterpriseReady
        } else if debt_points < 1500.0 {
            Verdict::Transitional
        } else {
            Verdict::DebtHeavy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::EnterpriseReady => "ENTERPRISE READY - High scalability potential",
            Verdict::Transitional => "TRANSITIONAL - Moderate maintenance overhead",
            Verdict::DebtHeavy => "DEBT HEAVY - Higher operational risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveMetrics {
    pub total_structural_units: usize,
    pub debt_points: f64,
    pub architectural_health: f64,
    pub technical_debt_cost: f64,
    pub velocity_risk: VelocityRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: ExecutiveMetrics,
    pub recommendations: Vec<String>,
    pub verdict: Verdict,
    /// RED nodes from the supplied risk pass, highest score first
    pub hotspots: Vec<RiskNode>,
}

/// `Σ (loc + 50 × classes) / 100`
pub fn debt_points(analyses: &[PersistedAnalysis]) -> f64 {
    let total: usize = analyses
        .iter()
        .map(|a| metrics::debt_score(a.loc, a.class_count))
        .sum();
    total as f64 / DEBT_POINT_UNITS
}

fn recommendations(debt_points: f64, units: usize) -> Vec<String> {
    let mut recs = Vec::new();
    if debt_points > CRITICAL_DEBT {
        recs.push(
            "CRITICAL: Refactor god objects before velocity collapses.".to_string(),
        );
    }
    if units < SMALL_CORPUS_UNITS {
        recs.push("GROWTH: Corpus is small; ingest more modules for a representative baseline.".to_string());
    } else {
        recs.push("STABILITY: Maintain the current modular structure.".to_string());
    }
    recs
}

pub struct ExecutiveInsights<'a> {
    store: &'a KnowledgeStore,
}

impl<'a> ExecutiveInsights<'a> {
    pub fn new(store: &'a KnowledgeStore) -> Self {
        Self { store }
    }

    pub fn generate_report(&self, risk: Option<&BTreeMap<String, RiskNode>>) -> Result<ExecutiveReport> {
        let analyses = self.store.all_analyses()?;
        Ok(build_report(&analyses, risk))
    }
}

pub fn build_report(
    analyses: &[PersistedAnalysis],
    risk: Option<&BTreeMap<String, RiskNode>>,
) -> ExecutiveReport {
    let units = analyses.len();
    let debt = debt_points(analyses);

    let hotspots = risk
        .map(|nodes| {
            nodes_in(nodes, Classification::Red)
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    ExecutiveReport {
        generated_at: Utc::now(),
        metrics: ExecutiveMetrics {
            total_structural_units: units,
            debt_points: debt,
            architectural_health: (100.0 - debt / HEALTH_DIVISOR).max(0.0),
            technical_debt_cost: debt * COST_PER_POINT,
            velocity_risk: if debt > VELOCITY_RISK_DEBT {
                VelocityRisk::High
            } else {
                VelocityRisk::Stable
            },
        },
        recommendations: recommendations(debt, units),
        verdict: Verdict::from_debt(debt),
        hotspots,
    }
}
