// Test utility module for fragmap integration tests
#![allow(dead_code)]

use fragmap::config::FragmapConfig;
use fragmap::core::{ClassFact, FactRecord, FunctionFact};
use fragmap::risk::NoHistory;
use fragmap::Engine;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Write `files` (relative path, content) under a fresh temp directory
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

pub fn in_memory_config() -> FragmapConfig {
    let mut config = FragmapConfig::default();
    config.store.enabled = false;
    config
}

/// Engine with no version history, ingested from `root`
pub fn ingested_engine(root: &Path, config: FragmapConfig) -> Engine {
    let mut engine = Engine::new(config).with_history(Arc::new(NoHistory));
    engine.ingest(&[root.to_path_buf()]).unwrap();
    engine
}

pub fn record(source: &str, loc: usize) -> FactRecord {
    FactRecord::empty(source, loc)
}

/// Record whose raw complexity is `functions` (one branch each) plus `classes`
pub fn record_with(source: &str, loc: usize, classes: usize, functions: usize) -> FactRecord {
    FactRecord {
        source: source.to_string(),
        imports: Vec::new(),
        functions: (0..functions)
            .map(|i| FunctionFact::new(format!("f{i}")))
            .collect(),
        classes: (0..classes).map(|i| ClassFact::new(format!("C{i}"))).collect(),
        loc,
    }
}

/// Python module with `classes` empty classes and `functions` trivial functions
pub fn python_module(classes: usize, functions: usize) -> String {
    let mut source = String::new();
    for i in 0..classes {
        source.push_str(&format!("class Model{i}:\n    pass\n\n"));
    }
    for i in 0..functions {
        source.push_str(&format!("def handler_{i}(value):\n    return value\n\n"));
    }
    source
}
