//! Session state accumulated across ingestions.
//!
//! A `Corpus` owns every fact record currently held plus the knowledge graph
//! derived from them. It is created when ingestion starts, lives as long as
//! the session, and is passed by reference into each pipeline stage.

use crate::core::FactRecord;
use crate::extraction::ExtractionBatch;
use crate::graph::{default_exclusions, KnowledgeGraph};
use crate::heuristics::Baseline;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    root: Option<PathBuf>,
    records: BTreeMap<String, FactRecord>,
    graph: KnowledgeGraph,
    exclusions: HashSet<String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            exclusions: default_exclusions(),
            ..Default::default()
        }
    }

    /// Root of the most recent ingestion
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: PathBuf) {
        self.root = Some(root);
    }

    /// Insert a record, superseding any previous record for the same source.
    ///
    /// The superseded record's edges are dropped before the new ones are
    /// inferred.
    pub fn insert(&mut self, record: FactRecord) {
        self.graph.remove_edges_from(&record.source);
        self.graph.infer_dependencies(&record, &self.exclusions);
        self.records.insert(record.source.clone(), record);
    }

    /// Merge an extraction batch from the calling thread
    pub fn merge(&mut self, batch: ExtractionBatch) -> usize {
        let merged = batch.records.len();
        for record in batch.records {
            self.insert(record);
        }
        merged
    }

    pub fn get(&self, source: &str) -> Option<&FactRecord> {
        self.records.get(source)
    }

    /// First source equal to `target`, else the first containing it
    pub fn resolve(&self, target: &str) -> Option<&FactRecord> {
        let target = target.trim_start_matches("./");
        self.records.get(target).or_else(|| {
            self.records
                .values()
                .find(|record| record.source.contains(target))
        })
    }

    /// Records whose source contains `scope`; all records for an empty scope
    pub fn select(&self, scope: &str) -> Vec<&FactRecord> {
        let scope = scope.trim_start_matches("./");
        self.records
            .values()
            .filter(|record| scope.is_empty() || record.source.contains(scope))
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &FactRecord> {
        self.records.values()
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn baseline(&self) -> Baseline {
        Baseline::from_records(self.records.values())
    }

    pub fn total_loc(&self) -> usize {
        self.records.values().map(|r| r.loc).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.graph.clear();
        self.root = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, imports: &[&str]) -> FactRecord {
        FactRecord {
            source: source.to_string(),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            loc: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_reingestion_supersedes_record_and_edges() {
        let mut corpus = Corpus::new();
        corpus.insert(record("a.py", &["models", "services"]));
        corpus.insert(record("a.py", &["models"]));

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get("a.py").unwrap().imports, vec!["models"]);
        assert_eq!(corpus.graph().edges().len(), 1);
    }

    #[test]
    fn test_merge_batch() {
        let mut corpus = Corpus::new();
        let batch = ExtractionBatch {
            records: vec![record("a.py", &[]), record("b.py", &["a"])],
            ..Default::default()
        };
        assert_eq!(corpus.merge(batch), 2);
        assert_eq!(corpus.total_loc(), 40);
        assert_eq!(corpus.graph().fan_in("a.py"), 1);
    }

    #[test]
    fn test_resolve_and_select() {
        let mut corpus = Corpus::new();
        corpus.insert(record("app/billing.py", &[]));
        corpus.insert(record("app/users.py", &[]));
        corpus.insert(record("tests/test_users.py", &[]));

        assert_eq!(corpus.resolve("billing").unwrap().source, "app/billing.py");
        assert_eq!(corpus.resolve("./app/users.py").unwrap().source, "app/users.py");
        assert!(corpus.resolve("payments").is_none());
        assert_eq!(corpus.select("users").len(), 2);
        assert_eq!(corpus.select("").len(), 3);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut corpus = Corpus::new();
        corpus.set_root(PathBuf::from("/repo"));
        corpus.insert(record("a.py", &["b"]));
        corpus.clear();

        assert!(corpus.is_empty());
        assert!(corpus.root().is_none());
        assert_eq!(corpus.graph().node_count(), 0);
        assert_eq!(corpus.baseline(), Baseline::default());
    }
}
