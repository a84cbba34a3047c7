use crate::core::{metrics, FactRecord};
use serde::Serialize;

/// A side wins when its complexity is below this share of the other's
const SIGNIFICANCE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffPoint {
    pub metric: String,
    pub a: f64,
    pub b: f64,
    /// Change from `a` to `b` in percent of `a`; 0 when `a` is 0
    pub delta_percent: f64,
}

impl DiffPoint {
    fn new(metric: &str, a: f64, b: f64) -> Self {
        let delta_percent = if a > 0.0 { (b - a) / a * 100.0 } else { 0.0 };
        Self {
            metric: metric.to_string(),
            a,
            b,
            delta_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "side", content = "source", rename_all = "snake_case")]
pub enum Winner {
    A(String),
    B(String),
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub target_a: String,
    pub target_b: String,
    pub diffs: Vec<DiffPoint>,
    pub winner: Winner,
    pub rationale: String,
}

/// Compare structural complexity (classes + functions + imports) and size.
///
/// The simpler side wins only when it is clearly simpler.
pub fn compare(a: &FactRecord, b: &FactRecord) -> ComparisonResult {
    let complexity_a = metrics::structural_complexity(a) as f64;
    let complexity_b = metrics::structural_complexity(b) as f64;

    let complexity = DiffPoint::new("Complexity", complexity_a, complexity_b);
    let loc = DiffPoint::new("LOC", a.loc as f64, b.loc as f64);
    let delta = complexity.delta_percent.abs();

    let (winner, rationale) = if complexity_a < complexity_b * SIGNIFICANCE_RATIO {
        (
            Winner::A(a.source.clone()),
            format!("{} is significantly simpler ({:.1}% less complex).", a.source, delta),
        )
    } else if complexity_b < complexity_a * SIGNIFICANCE_RATIO {
        (
            Winner::B(b.source.clone()),
            format!("{} is significantly simpler ({:.1}% less complex).", b.source, delta),
        )
    } else {
        (
            Winner::Tie,
            "Both approaches are similar in complexity.".to_string(),
        )
    };

    ComparisonResult {
        target_a: a.source.clone(),
        target_b: b.source.clone(),
        diffs: vec![complexity, loc],
        winner,
        rationale,
    }
}
