use crate::heuristics::{Interpretation, Smell};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complexity score above which an otherwise step-less plan splits by import clusters
const SPLIT_FALLBACK_SCORE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefactorPlan {
    pub goal: String,
    pub steps: Vec<String>,
    pub risk_level: RiskLevel,
    pub expected_gain: String,
}

/// Derive refactor steps from the smells of an interpretation.
///
/// Identical steps are emitted once, in first-seen order.
pub fn plan_refactor(interpretation: &Interpretation) -> RefactorPlan {
    let mut steps: Vec<String> = Vec::new();
    let mut push = |step: String| {
        if !steps.contains(&step) {
            steps.push(step);
        }
    };

    if interpretation.smells.contains(&Smell::MixedResponsibilities) {
        push("Extract standalone functions to 'utils.py'".to_string());
        push("Separate classes into distinct files".to_string());
    }

    for smell in &interpretation.smells {
        match smell {
            Smell::ComplexFunction { name, .. } => push(format!(
                "Break down function '{}' into smaller helper functions.",
                name
            )),
            Smell::LargeClass { name, .. } => {
                push(format!("Apply Extract Class refactoring to '{}'.", name))
            }
            Smell::UndocumentedComplexFunction { name } => {
                push(format!(
                    "Break down function '{}' into smaller helper functions.",
                    name
                ));
                push("Add docstrings to public API surface.".to_string());
            }
            Smell::ExcessiveComplexity { .. }
            | Smell::MixedResponsibilities
            | Smell::ComplexMethod { .. } => {}
        }
    }

    if steps.is_empty() && interpretation.complexity_score > SPLIT_FALLBACK_SCORE {
        steps.push("Split file into sub-modules based on import clusters".to_string());
    }
    if steps.is_empty() {
        steps.push("Perform manual audit of dependencies".to_string());
    }

    RefactorPlan {
        goal: format!("Reduce complexity of {}", interpretation.source),
        steps,
        risk_level: RiskLevel::Medium,
        expected_gain: format!("Complexity -{}%", expected_gain_percent(interpretation)),
    }
}

fn expected_gain_percent(interpretation: &Interpretation) -> i64 {
    ((interpretation.relative_complexity - 1.0) * 50.0).floor() as i64
}
