//! Persistence across engine sessions.

mod common;

use common::project;
use fragmap::audit::Trend;
use fragmap::config::FragmapConfig;
use fragmap::risk::NoHistory;
use fragmap::store::KnowledgeStore;
use fragmap::Engine;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn session(root: &std::path::Path) -> Engine {
    let mut engine = Engine::new(FragmapConfig::default()).with_history(Arc::new(NoHistory));
    engine.ingest(&[root.to_path_buf()]).unwrap();
    engine
}

#[test]
fn test_history_accumulates_across_sessions() {
    let dir = project(&[("app.py", "def a():\n    return 1\n")]);

    session(dir.path()).analyze("").unwrap();

    std::fs::write(
        dir.path().join("app.py"),
        "def a(x):\n    if x:\n        return 1\n    return 2\n\ndef b():\n    return 3\n",
    )
    .unwrap();
    let mut second = session(dir.path());
    second.analyze("").unwrap();

    let forecast = second.get_forecast("app").unwrap();
    assert!(!forecast.insufficient_history);
    assert!(forecast.velocity > 0.0);
    assert_eq!(forecast.trend, Trend::Degradation);
}

#[test]
fn test_store_contents_after_analysis() {
    let dir = project(&[
        ("pkg/a.py", "import pkg.b\n"),
        ("pkg/b.py", "class B:\n    pass\n"),
    ]);
    let mut engine = session(dir.path());
    engine.analyze("").unwrap();
    engine.score_risk("").unwrap();
    drop(engine);

    let store = KnowledgeStore::open(dir.path().join(".fragmap/store.redb")).unwrap();
    let analyses = store.all_analyses().unwrap();
    let sources: Vec<_> = analyses.iter().map(|a| a.source.as_str()).collect();
    assert_eq!(sources, vec!["pkg/a.py", "pkg/b.py"]);

    let b = store.get_analysis("pkg/b.py").unwrap().unwrap();
    assert_eq!(b.class_count, 1);
    assert!(b.risk_score.is_some());
    assert_eq!(store.risk_history("pkg/b.py").unwrap().len(), 1);

    let operations: Vec<_> = store
        .recall("")
        .unwrap()
        .into_iter()
        .map(|i| i.operation)
        .collect();
    assert_eq!(operations, vec!["ingest", "analyze", "score_risk"]);
}

#[test]
fn test_disabled_store_writes_nothing() {
    let dir = project(&[("app.py", "x = 1\n")]);
    let mut config = FragmapConfig::default();
    config.store.enabled = false;
    let mut engine = Engine::new(config).with_history(Arc::new(NoHistory));
    engine.ingest(&[dir.path().to_path_buf()]).unwrap();
    engine.analyze("").unwrap();

    assert!(engine.store().is_none());
    assert!(!dir.path().join(".fragmap").exists());
}

#[test]
fn test_unopenable_store_degrades_with_warning() {
    let dir = project(&[("app.py", "x = 1\n")]);
    // A directory where the database file should be
    std::fs::create_dir_all(dir.path().join(".fragmap/store.redb")).unwrap();

    let mut engine = Engine::new(FragmapConfig::default()).with_history(Arc::new(NoHistory));
    let report = engine.ingest(&[dir.path().to_path_buf()]).unwrap();

    assert!(engine.store().is_none());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(engine.analyze("").unwrap().per_file.len(), 1);
}
