pub mod metrics;

use serde::{Deserialize, Serialize};

/// Structural facts extracted from one source file.
///
/// Produced once per ingestion and never mutated afterwards; re-ingesting the
/// same path replaces the whole record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactRecord {
    pub source: String,
    pub imports: Vec<String>,
    pub functions: Vec<FunctionFact>,
    pub classes: Vec<ClassFact>,
    pub loc: usize,
}

impl FactRecord {
    /// A record with only the line count populated.
    ///
    /// This is what the extractor yields for sources it cannot parse.
    pub fn empty(source: impl Into<String>, loc: usize) -> Self {
        Self {
            source: source.into(),
            loc,
            ..Default::default()
        }
    }

    /// All methods across every class, paired with the owning class name.
    pub fn methods(&self) -> impl Iterator<Item = (&ClassFact, &FunctionFact)> {
        self.classes
            .iter()
            .flat_map(|class| class.methods.iter().map(move |m| (class, m)))
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionFact {
    pub name: String,
    pub args: Vec<String>,
    pub has_docstring: bool,
    pub is_async: bool,
    pub decorators: Vec<String>,
    /// 1 + number of `if`/`elif`, loop and exception-handler constructs in the body
    pub branch_complexity: u32,
}

impl FunctionFact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            has_docstring: false,
            is_async: false,
            decorators: Vec::new(),
            branch_complexity: 1,
        }
    }

    pub fn with_complexity(mut self, branch_complexity: u32) -> Self {
        self.branch_complexity = branch_complexity.max(1);
        self
    }

    pub fn with_docstring(mut self, has_docstring: bool) -> Self {
        self.has_docstring = has_docstring;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassFact {
    pub name: String,
    pub base_types: Vec<String>,
    pub methods: Vec<FunctionFact>,
    pub has_docstring: bool,
    pub decorators: Vec<String>,
}

impl ClassFact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_types: Vec::new(),
            methods: Vec::new(),
            has_docstring: false,
            decorators: Vec::new(),
        }
    }

    pub fn with_methods(mut self, methods: Vec<FunctionFact>) -> Self {
        self.methods = methods;
        self
    }
}

/// Kind of entity held in the knowledge graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Function,
    Class,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Function => "function",
            NodeKind::Class => "class",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
