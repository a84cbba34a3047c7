//! Human-readable conclusions drawn from an interpretation.

pub mod plan;

pub use plan::{plan_refactor, RefactorPlan, RiskLevel};

use crate::heuristics::{Interpretation, Role};
use serde::Serialize;

/// Relative complexity above which the summary quotes the multiple
const SUMMARY_MULTIPLE_THRESHOLD: f64 = 1.2;
/// Relative complexity above which a refactor is recommended and planned
const REFACTOR_THRESHOLD: f64 = 2.0;

const BASE_CONFIDENCE: f64 = 0.5;
const SIGNAL_CONFIDENCE: f64 = 0.2;
/// Never claim certainty without executing the code
pub const MAX_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Judgement {
    pub summary: String,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
    pub refactor_plan: Option<RefactorPlan>,
    pub confidence: f64,
}

pub fn assess(interpretation: &Interpretation) -> Judgement {
    let mut summary = format!(
        "File '{}' acting as {}.",
        interpretation.source,
        interpretation.role.label()
    );
    if interpretation.relative_complexity > SUMMARY_MULTIPLE_THRESHOLD {
        summary.push_str(&format!(
            " Complexity is {:.1}x baseline.",
            interpretation.relative_complexity
        ));
    }

    let mut risks: Vec<String> = interpretation
        .smells
        .iter()
        .map(|smell| format!("Risk: {}", smell))
        .collect();
    if interpretation.role == Role::GodObjectCandidate {
        risks.push("Critical Risk: High coupling probability.".to_string());
    }

    let (recommendation, refactor_plan) = if interpretation.relative_complexity > REFACTOR_THRESHOLD {
        (
            "Immediate refactor recommended.",
            Some(plan_refactor(interpretation)),
        )
    } else if interpretation.role == Role::Coordinator {
        ("Verify import necessity.", None)
    } else {
        ("Code structure is within nominal parameters.", None)
    };

    Judgement {
        summary,
        risks,
        recommendations: vec![recommendation.to_string()],
        refactor_plan,
        confidence: calibrate_confidence(interpretation),
    }
}

pub fn calibrate_confidence(interpretation: &Interpretation) -> f64 {
    let mut score = BASE_CONFIDENCE;
    if interpretation.role != Role::Worker {
        score += SIGNAL_CONFIDENCE;
    }
    if !interpretation.smells.is_empty() {
        score += SIGNAL_CONFIDENCE;
    }
    score.clamp(0.0, MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::Smell;
    use pretty_assertions::assert_eq;

    fn interpretation(role: Role, relative: f64, smells: Vec<Smell>) -> Interpretation {
        Interpretation {
            source: "svc.py".into(),
            complexity_score: relative * 10.0,
            role,
            smells,
            relative_complexity: relative,
        }
    }

    #[test]
    fn test_nominal_worker() {
        let judgement = assess(&interpretation(Role::Worker, 1.0, vec![]));
        assert_eq!(judgement.summary, "File 'svc.py' acting as WORKER.");
        assert!(judgement.risks.is_empty());
        assert_eq!(
            judgement.recommendations,
            vec!["Code structure is within nominal parameters."]
        );
        assert!(judgement.refactor_plan.is_none());
        assert_eq!(judgement.confidence, 0.5);
    }

    #[test]
    fn test_coordinator_verifies_imports() {
        let judgement = assess(&interpretation(Role::Coordinator, 1.5, vec![]));
        assert_eq!(
            judgement.summary,
            "File 'svc.py' acting as COORDINATOR. Complexity is 1.5x baseline."
        );
        assert_eq!(judgement.recommendations, vec!["Verify import necessity."]);
        assert!((judgement.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_god_object_gets_plan_and_coupling_risk() {
        let judgement = assess(&interpretation(
            Role::GodObjectCandidate,
            3.0,
            vec![Smell::ExcessiveComplexity { relative: 3.0 }],
        ));
        assert_eq!(
            judgement.risks,
            vec![
                "Risk: Excessive Complexity (3.0x avg)".to_string(),
                "Critical Risk: High coupling probability.".to_string(),
            ]
        );
        assert_eq!(judgement.recommendations, vec!["Immediate refactor recommended."]);
        assert!(judgement.refactor_plan.is_some());
        assert!((judgement.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_stub_with_smells_confidence() {
        let judgement = assess(&interpretation(
            Role::Stub,
            1.0,
            vec![Smell::MixedResponsibilities],
        ));
        assert!(judgement.confidence <= MAX_CONFIDENCE);
        assert!((judgement.confidence - 0.9).abs() < 1e-9);
    }
}
