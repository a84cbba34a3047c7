//! Baseline-relative interpretation of fact records.
//!
//! The baseline is derived from whatever records the corpus currently holds;
//! the interpreter turns one record plus that baseline into a role and a list
//! of smells. Both are pure and never read persisted history.

pub mod baseline;
pub mod interpreter;

pub use baseline::Baseline;
pub use interpreter::interpret;

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Architectural role of a file relative to the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Worker,
    Coordinator,
    GodObjectCandidate,
    Stub,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Coordinator => "coordinator",
            Role::GodObjectCandidate => "god_object_candidate",
            Role::Stub => "stub",
        }
    }

    /// Upper-case label used in judgement summaries
    pub fn label(&self) -> &'static str {
        match self {
            Role::Worker => "WORKER",
            Role::Coordinator => "COORDINATOR",
            Role::GodObjectCandidate => "GOD_OBJECT_CANDIDATE",
            Role::Stub => "STUB",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "worker" => Some(Role::Worker),
            "coordinator" => Some(Role::Coordinator),
            "god_object_candidate" => Some(Role::GodObjectCandidate),
            "stub" => Some(Role::Stub),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected code smell.
///
/// Rendered through `Display`, which is also the serialized form.
#[derive(Debug, Clone, PartialEq)]
pub enum Smell {
    ExcessiveComplexity { relative: f64 },
    MixedResponsibilities,
    ComplexFunction { name: String, complexity: u32 },
    UndocumentedComplexFunction { name: String },
    LargeClass { name: String, methods: usize },
    ComplexMethod {
        class: String,
        name: String,
        complexity: u32,
    },
}

impl fmt::Display for Smell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Smell::ExcessiveComplexity { relative } => {
                write!(f, "Excessive Complexity ({:.1}x avg)", relative)
            }
            Smell::MixedResponsibilities => {
                f.write_str("Mixed Responsibilities (Classes + many functions)")
            }
            Smell::ComplexFunction { name, complexity } => {
                write!(f, "Complex Function '{}' (CC: {})", name, complexity)
            }
            Smell::UndocumentedComplexFunction { name } => {
                write!(f, "Undocumented Complex Function '{}'", name)
            }
            Smell::LargeClass { name, methods } => {
                write!(f, "Large Class '{}' ({} methods)", name, methods)
            }
            Smell::ComplexMethod {
                class,
                name,
                complexity,
            } => write!(f, "Complex Method '{}.{}' (CC: {})", class, name, complexity),
        }
    }
}

impl Serialize for Smell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Role and smells of one file, relative to the corpus baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub source: String,
    pub complexity_score: f64,
    pub role: Role,
    pub smells: Vec<Smell>,
    pub relative_complexity: f64,
}
