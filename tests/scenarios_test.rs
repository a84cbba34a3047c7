//! End-to-end behaviour on small hand-built corpora.

mod common;

use common::{in_memory_config, ingested_engine, project, python_module, record, record_with};
use fragmap::audit::{velocity, AutonomousAuditor, Trend};
use fragmap::config::{AuditConfig, PolicyConfig};
use fragmap::core::FactRecord;
use fragmap::heuristics::{interpret, Baseline, Role, Smell};
use fragmap::policy::{PolicyGuard, PolicyRule, Severity};
use fragmap::risk::{ActivityMap, RiskScorer};
use fragmap::store::{HistorySnapshot, KnowledgeStore};
use fragmap::Corpus;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_tiny_file_is_a_stub_without_smells() {
    let dir = project(&[("tiny.py", "x = 1\ny = 2\nz = x + y\nprint(z)\n\n")]);
    let mut engine = ingested_engine(dir.path(), in_memory_config());

    let report = engine.analyze("").unwrap();
    assert_eq!(report.per_file.len(), 1);
    assert_eq!(report.per_file[0].role, Role::Stub);
    assert!(report.smells.is_empty());
}

#[test]
fn test_self_baseline_gives_unit_relative_complexity() {
    let dir = project(&[("everything.py", &python_module(3, 12))]);
    let engine = ingested_engine(dir.path(), in_memory_config());

    let record = engine.corpus().get("everything.py").unwrap();
    assert_eq!(record.classes.len(), 3);
    assert_eq!(record.functions.len(), 12);

    let (interpretation, _) = engine.assess_record(record);
    assert_eq!(interpretation.relative_complexity, 1.0);
    assert!(interpretation.smells.contains(&Smell::MixedResponsibilities));
    assert!(interpretation.smells[0]
        .to_string()
        .to_lowercase()
        .contains("mixed responsibilities"));
}

#[test]
fn test_loc_ceiling_violation_only_for_large_file() {
    let a = record_with("a.py", 1000, 0, 25);
    let b = record_with("b.py", 50, 0, 2);
    let guard = PolicyGuard::new(PolicyConfig {
        max_loc: 1000,
        ..Default::default()
    });

    let report = guard.check([&a, &b], &[]);
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.rule, PolicyRule::MaxLoc);
    assert_eq!(violation.target, "a.py");
    assert_eq!(violation.severity, Severity::Warning);
    assert_eq!(report.health_score, 90.0);
}

#[test]
fn test_fan_in_drives_criticality() {
    let mut corpus = Corpus::new();
    let mut x = record("x.py", 20);
    x.imports = vec!["y".to_string()];
    let mut z = record("z.py", 20);
    z.imports = vec!["y".to_string()];
    corpus.insert(x);
    corpus.insert(z);
    corpus.insert(record("y.py", 20));
    corpus.insert(record("lonely.py", 20));

    let nodes = RiskScorer::default().score(corpus.records(), corpus.graph(), &ActivityMap::new());
    assert_eq!(nodes["y.py"].criticality_risk, 1.0);
    assert_eq!(nodes["lonely.py"].criticality_risk, 0.0);
    assert_eq!(nodes["x.py"].criticality_risk, 0.0);
}

#[test]
fn test_increasing_complexity_is_degradation() {
    let dir = TempDir::new().unwrap();
    let store = KnowledgeStore::open(dir.path().join("store.redb")).unwrap();
    for (i, complexity) in [10.0, 12.0, 14.0, 16.0, 18.0].into_iter().enumerate() {
        store
            .append_history(
                "app.py",
                &HistorySnapshot {
                    timestamp_ms: 1_000 + i as u64,
                    loc: 100,
                    complexity,
                    health_score: 100.0,
                },
            )
            .unwrap();
    }

    let history = store.history("app.py", 5).unwrap();
    assert_eq!(velocity(&history), 2.0);

    let forecast = AutonomousAuditor::new(&store, AuditConfig::default())
        .forecast("app.py")
        .unwrap();
    assert_eq!(forecast.velocity, 2.0);
    assert_eq!(forecast.trend, Trend::Degradation);
    assert_eq!(forecast.trend.as_str(), "degradation");
    assert!(!forecast.insufficient_history);
}

#[test]
fn test_empty_baseline_defaults() {
    let baseline = Baseline::from_records(std::iter::empty::<&FactRecord>());
    assert_eq!(baseline.avg_complexity, 10.0);
    assert_eq!(baseline.avg_imports, 5.0);

    let interpretation = interpret(&record_with("solo.py", 50, 0, 5), &baseline);
    assert_eq!(interpretation.relative_complexity, 0.5);
}
