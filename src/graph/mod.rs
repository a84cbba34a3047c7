//! Knowledge graph of files, functions and classes.
//!
//! Nodes are keyed by `(kind, name)` and upserted with last-write-wins
//! metadata, so a function name shared by two files holds whichever file was
//! recorded last. Edges are appended without deduplication; a module imported
//! twice contributes twice to its fan-in.

use crate::core::{metrics, FactRecord, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Root module tokens that never produce dependency edges
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "__future__",
    "abc",
    "argparse",
    "asyncio",
    "collections",
    "contextlib",
    "copy",
    "dataclasses",
    "datetime",
    "enum",
    "functools",
    "glob",
    "hashlib",
    "io",
    "itertools",
    "json",
    "logging",
    "math",
    "os",
    "pathlib",
    "random",
    "re",
    "shutil",
    "subprocess",
    "sys",
    "tempfile",
    "threading",
    "time",
    "typing",
    "unittest",
    "uuid",
    "numpy",
    "pandas",
    "requests",
    "pytest",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    DependsOn,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::DependsOn => "depends_on",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub kind: NodeKind,
    pub metadata: BTreeMap<String, Value>,
}

impl GraphNode {
    fn matches(&self, needle: &str) -> bool {
        if self.name.to_lowercase().contains(needle) {
            return true;
        }
        serde_json::to_string(&self.metadata)
            .map(|meta| meta.to_lowercase().contains(needle))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: BTreeMap<(NodeKind, String), GraphNode>,
    edges: Vec<Edge>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the node for `(kind, name)`
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind, metadata: BTreeMap<String, Value>) {
        let name = name.into();
        self.nodes.insert(
            (kind, name.clone()),
            GraphNode {
                name,
                kind,
                metadata,
            },
        );
    }

    pub fn add_edge(&mut self, source: impl Into<String>, target: impl Into<String>, relation: Relation) {
        self.edges.push(Edge {
            source: source.into(),
            target: target.into(),
            relation,
        });
    }

    /// Drop every edge originating at `source`.
    ///
    /// Used when a file is re-ingested so its superseded imports stop counting.
    pub fn remove_edges_from(&mut self, source: &str) {
        self.edges.retain(|e| e.source != source);
    }

    /// Case-insensitive substring search over node names and metadata
    pub fn find_related(&self, query: &str) -> Vec<&GraphNode> {
        let needle = query.to_lowercase();
        self.nodes.values().filter(|n| n.matches(&needle)).collect()
    }

    pub fn node(&self, kind: NodeKind, name: &str) -> Option<&GraphNode> {
        self.nodes.get(&(kind, name.to_string()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_count_by_kind(&self, kind: NodeKind) -> usize {
        self.nodes.keys().filter(|(k, _)| *k == kind).count()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Record a file and its definitions, then add a `depends_on` edge per
    /// non-excluded import root.
    pub fn infer_dependencies(&mut self, record: &FactRecord, exclusions: &HashSet<String>) {
        self.add_node(
            record.source.clone(),
            NodeKind::File,
            BTreeMap::from([
                ("loc".to_string(), json!(record.loc)),
                ("imports".to_string(), json!(record.imports.len())),
                ("functions".to_string(), json!(record.functions.len())),
                ("classes".to_string(), json!(record.classes.len())),
                (
                    "complexity".to_string(),
                    json!(metrics::structural_complexity(record)),
                ),
            ]),
        );

        for function in &record.functions {
            self.add_node(
                function.name.clone(),
                NodeKind::Function,
                BTreeMap::from([
                    ("file".to_string(), json!(record.source)),
                    ("args".to_string(), json!(function.args)),
                    ("complexity".to_string(), json!(function.branch_complexity)),
                    ("is_async".to_string(), json!(function.is_async)),
                ]),
            );
        }

        for class in &record.classes {
            self.add_node(
                class.name.clone(),
                NodeKind::Class,
                BTreeMap::from([
                    ("file".to_string(), json!(record.source)),
                    ("bases".to_string(), json!(class.base_types)),
                    ("methods".to_string(), json!(class.methods.len())),
                ]),
            );
        }

        for import in &record.imports {
            let Some(root) = root_module(import) else {
                continue;
            };
            if exclusions.contains(root) {
                continue;
            }
            self.add_edge(record.source.clone(), root, Relation::DependsOn);
        }
    }

    /// Fan-in of a file: edges from other files that target its module stem
    /// or one of its package directory names.
    pub fn fan_in(&self, source: &str) -> usize {
        let names = module_names(source);
        self.edges
            .iter()
            .filter(|e| e.source != source && names.iter().any(|n| *n == e.target))
            .count()
    }

    /// Fan-in for every edge target, highest first, ties by name
    pub fn top_fan_in(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *counts.entry(edge.target.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}

pub fn default_exclusions() -> HashSet<String> {
    DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

/// First dotted segment of an import reference, ignoring relative dots
pub fn root_module(import: &str) -> Option<&str> {
    import
        .trim_start_matches('.')
        .split('.')
        .next()
        .filter(|token| !token.is_empty())
}

/// Module names a source path can be imported under: its file stem plus each
/// parent directory. `__init__` is not a module name on its own.
pub fn module_names(source: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = source.split('/').filter(|p| !p.is_empty()).collect();
    let Some(file) = parts.pop() else {
        return Vec::new();
    };
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    if stem != "__init__" {
        parts.push(stem);
    }
    parts
}
