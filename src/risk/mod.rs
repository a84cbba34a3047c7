//! Multi-factor fragility scoring.
//!
//! Each file gets four sub-scores in `[0, 1]`:
//!
//! - structural: `min(1, 0.7 * complexity / 20 + 0.3 * loc / 500)`
//! - volatility: revisions in the window over the busiest file's revisions
//! - knowledge: inverse bus factor from distinct contributors
//! - criticality: fan-in over the highest fan-in in the pass (blast radius)
//!
//! The weighted total lands in `[0, 100]` and maps to a classification tier.
//! Every pass recomputes all nodes from scratch.

pub mod history;

pub use history::{
    activity_or_empty, query_with_timeout, ActivityMap, FileActivity, Git2History, NoHistory,
    VersionHistory,
};

use crate::config::RiskWeights;
use crate::core::{metrics, FactRecord};
use crate::graph::KnowledgeGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const STRUCTURAL_COMPLEXITY_SCALE: f64 = 20.0;
const STRUCTURAL_LOC_SCALE: f64 = 500.0;
const STRUCTURAL_COMPLEXITY_SHARE: f64 = 0.7;
const STRUCTURAL_LOC_SHARE: f64 = 0.3;

const RED_THRESHOLD: f64 = 75.0;
const ORANGE_THRESHOLD: f64 = 50.0;
const YELLOW_THRESHOLD: f64 = 25.0;
const BLUE_CRITICALITY: f64 = 0.6;

/// Discrete fragility tier, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Red,
    Orange,
    Yellow,
    /// Highly central but currently stable
    Blue,
    Green,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Red => "RED",
            Classification::Orange => "ORANGE",
            Classification::Yellow => "YELLOW",
            Classification::Blue => "BLUE",
            Classification::Green => "GREEN",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Classification::Red => "structural instability",
            Classification::Orange => "economic risk",
            Classification::Yellow => "governance watch",
            Classification::Blue => "strategic hub",
            Classification::Green => "stable",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First matching tier wins, from most to least severe.
pub fn classify(total: f64, criticality: f64) -> Classification {
    if total > RED_THRESHOLD {
        Classification::Red
    } else if total > ORANGE_THRESHOLD {
        Classification::Orange
    } else if total > YELLOW_THRESHOLD {
        Classification::Yellow
    } else if criticality > BLUE_CRITICALITY {
        Classification::Blue
    } else {
        Classification::Green
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskNode {
    pub source: String,
    pub structural_risk: f64,
    pub volatility_risk: f64,
    pub knowledge_risk: f64,
    pub criticality_risk: f64,
    pub total_risk_score: f64,
    pub classification: Classification,
}

pub fn structural_risk(complexity: f64, loc: usize) -> f64 {
    let score = STRUCTURAL_COMPLEXITY_SHARE * complexity / STRUCTURAL_COMPLEXITY_SCALE
        + STRUCTURAL_LOC_SHARE * loc as f64 / STRUCTURAL_LOC_SCALE;
    score.clamp(0.0, 1.0)
}

/// Inverse bus factor; zero when nobody is known to have touched the file
pub fn knowledge_risk(contributors: usize) -> f64 {
    match contributors {
        0 => 0.0,
        1 => 0.9,
        2 => 0.5,
        _ => 0.1,
    }
}

/// `value / max`, or 0 when nothing in the pass registered at all
pub fn normalized(value: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        (value as f64 / max as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    weights: RiskWeights,
}

impl RiskScorer {
    pub fn new(weights: RiskWeights) -> Self {
        Self { weights }
    }

    pub fn total(&self, structural: f64, volatility: f64, knowledge: f64, criticality: f64) -> f64 {
        let weighted = self.weights.structural * structural
            + self.weights.volatility * volatility
            + self.weights.knowledge * knowledge
            + self.weights.criticality * criticality;
        (100.0 * weighted).clamp(0.0, 100.0)
    }

    /// Score every record against the graph and version-control activity.
    ///
    /// Normalization maxima are taken over the records in this pass only.
    pub fn score<'a, I>(
        &self,
        records: I,
        graph: &KnowledgeGraph,
        activity: &ActivityMap,
    ) -> BTreeMap<String, RiskNode>
    where
        I: IntoIterator<Item = &'a FactRecord>,
    {
        let records: Vec<&FactRecord> = records.into_iter().collect();

        let fan_in: Vec<usize> = records.iter().map(|r| graph.fan_in(&r.source)).collect();
        let revisions: Vec<usize> = records
            .iter()
            .map(|r| activity.get(&r.source).map_or(0, |a| a.revisions))
            .collect();
        let max_fan_in = fan_in.iter().copied().max().unwrap_or(0);
        let max_revisions = revisions.iter().copied().max().unwrap_or(0);

        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let structural =
                    structural_risk(f64::from(metrics::raw_complexity(record)), record.loc);
                let volatility = normalized(revisions[i], max_revisions);
                let knowledge = knowledge_risk(
                    activity
                        .get(&record.source)
                        .map_or(0, |a| a.contributors.len()),
                );
                let criticality = normalized(fan_in[i], max_fan_in);
                let total = self.total(structural, volatility, knowledge, criticality);

                let node = RiskNode {
                    source: record.source.clone(),
                    structural_risk: structural,
                    volatility_risk: volatility,
                    knowledge_risk: knowledge,
                    criticality_risk: criticality,
                    total_risk_score: total,
                    classification: classify(total, criticality),
                };
                (record.source.clone(), node)
            })
            .collect()
    }
}

/// Nodes in a tier, highest total first
pub fn nodes_in(
    nodes: &BTreeMap<String, RiskNode>,
    classification: Classification,
) -> Vec<&RiskNode> {
    let mut matching: Vec<&RiskNode> = nodes
        .values()
        .filter(|n| n.classification == classification)
        .collect();
    matching.sort_by(|a, b| b.total_risk_score.total_cmp(&a.total_risk_score));
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FunctionFact;
    use crate::graph::default_exclusions;

    fn record(source: &str, imports: &[&str], loc: usize) -> FactRecord {
        FactRecord {
            source: source.to_string(),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            loc,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(75.1, 0.0), Classification::Red);
        assert_eq!(classify(75.0, 0.0), Classification::Orange);
        assert_eq!(classify(50.5, 0.0), Classification::Orange);
        assert_eq!(classify(30.0, 0.0), Classification::Yellow);
        assert_eq!(classify(30.0, 1.0), Classification::Yellow);
        assert_eq!(classify(20.0, 0.61), Classification::Blue);
        assert_eq!(classify(20.0, 0.6), Classification::Green);
    }

    #[test]
    fn test_structural_risk_caps_at_one() {
        assert_eq!(structural_risk(100.0, 5000), 1.0);
        assert!((structural_risk(10.0, 250) - (0.35 + 0.15)).abs() < 1e-9);
        assert_eq!(structural_risk(0.0, 0), 0.0);
    }

    #[test]
    fn test_knowledge_risk_bus_factor() {
        assert_eq!(knowledge_risk(0), 0.0);
        assert_eq!(knowledge_risk(1), 0.9);
        assert_eq!(knowledge_risk(2), 0.5);
        assert_eq!(knowledge_risk(7), 0.1);
    }

    #[test]
    fn test_criticality_is_normalized_fan_in() {
        let records = vec![
            record("x.py", &["y"], 20),
            record("z.py", &["y"], 20),
            record("y.py", &[], 20),
            record("w.py", &[], 20),
        ];
        let mut graph = KnowledgeGraph::new();
        for r in &records {
            graph.infer_dependencies(r, &default_exclusions());
        }

        let nodes = RiskScorer::default().score(&records, &graph, &ActivityMap::new());
        assert_eq!(nodes["y.py"].criticality_risk, 1.0);
        assert_eq!(nodes["w.py"].criticality_risk, 0.0);
        assert_eq!(nodes["y.py"].volatility_risk, 0.0);
        assert_eq!(nodes["y.py"].knowledge_risk, 0.0);
    }

    #[test]
    fn test_volatility_and_knowledge_from_activity() {
        let records = vec![record("a.py", &[], 10), record("b.py", &[], 10)];
        let mut activity = ActivityMap::new();
        activity.insert(
            "a.py".into(),
            FileActivity {
                revisions: 8,
                contributors: ["ann".to_string()].into_iter().collect(),
            },
        );
        activity.insert(
            "b.py".into(),
            FileActivity {
                revisions: 2,
                contributors: ["ann".to_string(), "bob".to_string()].into_iter().collect(),
            },
        );

        let nodes = RiskScorer::default().score(&records, &KnowledgeGraph::new(), &activity);
        assert_eq!(nodes["a.py"].volatility_risk, 1.0);
        assert_eq!(nodes["b.py"].volatility_risk, 0.25);
        assert_eq!(nodes["a.py"].knowledge_risk, 0.9);
        assert_eq!(nodes["b.py"].knowledge_risk, 0.5);
    }

    #[test]
    fn test_heavy_hot_file_is_red() {
        let mut heavy = record("core.py", &[], 1200);
        heavy.functions = vec![FunctionFact::new("run").with_complexity(40)];
        let records = vec![heavy, record("cli.py", &["core"], 10)];
        let mut graph = KnowledgeGraph::new();
        for r in &records {
            graph.infer_dependencies(r, &default_exclusions());
        }
        let mut activity = ActivityMap::new();
        activity.insert(
            "core.py".into(),
            FileActivity {
                revisions: 5,
                contributors: ["ann".to_string()].into_iter().collect(),
            },
        );

        let nodes = RiskScorer::default().score(&records, &graph, &activity);
        let core = &nodes["core.py"];
        // 30 + 30 + 0.15 * 0.9 * 100 + 25
        assert!((core.total_risk_score - 98.5).abs() < 1e-9);
        assert_eq!(core.classification, Classification::Red);
        assert_eq!(nodes_in(&nodes, Classification::Red).len(), 1);
    }

    #[test]
    fn test_classification_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&Classification::Orange).unwrap(),
            "\"ORANGE\""
        );
    }
}
