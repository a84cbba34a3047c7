//! Static architectural rules and the health score derived from them.

use crate::config::PolicyConfig;
use crate::core::FactRecord;
use crate::graph::Edge;
use serde::{Deserialize, Serialize};
use std::fmt;

const FULL_HEALTH: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Advisory,
    Warning,
    Critical,
    Blocker,
}

impl Severity {
    /// Health points deducted per violation
    pub fn penalty(&self) -> f64 {
        match self {
            Severity::Blocker => 25.0,
            Severity::Warning => 10.0,
            Severity::Info => 2.0,
            Severity::Advisory | Severity::Critical => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Advisory => "advisory",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Blocker => "blocker",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyRule {
    MaxLoc,
    LowCohesion,
    DependencyInversionViolation,
}

impl PolicyRule {
    pub fn id(&self) -> &'static str {
        match self {
            PolicyRule::MaxLoc => "MAX_LOC",
            PolicyRule::LowCohesion => "LOW_COHESION",
            PolicyRule::DependencyInversionViolation => "DEPENDENCY_INVERSION_VIOLATION",
        }
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: PolicyRule,
    pub message: String,
    pub severity: Severity,
    /// File or module the violation is attributed to
    pub target: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyReport {
    pub violations: Vec<Violation>,
    pub health_score: f64,
}

/// `100 - Σ penalty`, clamped to `[0, 100]`
pub fn health_score(violations: &[Violation]) -> f64 {
    let penalty: f64 = violations.iter().map(|v| v.severity.penalty()).sum();
    (FULL_HEALTH - penalty).clamp(0.0, FULL_HEALTH)
}

#[derive(Debug, Clone, Default)]
pub struct PolicyGuard {
    config: PolicyConfig,
}

impl PolicyGuard {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn check<'a, I>(&self, records: I, edges: &[Edge]) -> PolicyReport
    where
        I: IntoIterator<Item = &'a FactRecord>,
    {
        let mut violations: Vec<Violation> = records
            .into_iter()
            .flat_map(|record| self.check_record(record))
            .collect();
        violations.extend(edges.iter().flat_map(|edge| self.check_edge(edge)));

        let health_score = health_score(&violations);
        PolicyReport {
            violations,
            health_score,
        }
    }

    fn check_record(&self, record: &FactRecord) -> Vec<Violation> {
        let mut violations = Vec::new();

        if record.loc >= self.config.max_loc {
            violations.push(Violation {
                rule: PolicyRule::MaxLoc,
                message: format!(
                    "Module '{}' exceeds LOC budget ({}/{})",
                    record.source, record.loc, self.config.max_loc
                ),
                severity: Severity::Warning,
                target: record.source.clone(),
                mitigation: "Consider splitting into smaller sub-modules.".to_string(),
            });
        }

        let class_count = record.classes.len();
        if class_count > self.config.max_classes_per_file {
            violations.push(Violation {
                rule: PolicyRule::LowCohesion,
                message: format!(
                    "Module '{}' contains {} classes. High risk of low cohesion.",
                    record.source, class_count
                ),
                severity: Severity::Warning,
                target: record.source.clone(),
                mitigation: "Group related classes into a new package.".to_string(),
            });
        }

        violations
    }

    /// A lower-level module (matched as a substring of the edge source) must
    /// not depend on a higher-level one (substring of the edge target).
    fn check_edge(&self, edge: &Edge) -> Vec<Violation> {
        let source = edge.source.to_lowercase();
        let target = edge.target.to_lowercase();

        self.config
            .forbidden_dependencies
            .iter()
            .filter(|(base, forbidden)| {
                source.contains(&base.to_lowercase())
                    && forbidden.iter().any(|f| target.contains(&f.to_lowercase()))
            })
            .map(|_| Violation {
                rule: PolicyRule::DependencyInversionViolation,
                message: format!(
                    "Architectural leak: lower-level '{}' depends on higher-level '{}'",
                    edge.source, edge.target
                ),
                severity: Severity::Blocker,
                target: edge.source.clone(),
                mitigation:
                    "Refactor interfaces to use dependency injection or abstract base classes."
                        .to_string(),
            })
            .collect()
    }
}
