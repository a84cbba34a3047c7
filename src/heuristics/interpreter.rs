use super::{Baseline, Interpretation, Role, Smell};
use crate::core::{metrics, FactRecord};

/// Floor for the baseline denominator
const EPSILON: f64 = 1e-9;

const COORDINATOR_IMPORT_FACTOR: f64 = 1.5;
const GOD_OBJECT_RELATIVE: f64 = 2.0;
const STUB_MAX_LOC: usize = 10;

const EXCESSIVE_RELATIVE: f64 = 2.5;
const MIXED_MIN_CLASSES: usize = 1;
const MIXED_MIN_FUNCTIONS: usize = 10;
const COMPLEX_FUNCTION_CC: u32 = 10;
const UNDOCUMENTED_FUNCTION_CC: u32 = 5;
const LARGE_CLASS_METHODS: usize = 20;

/// Classify a record against the corpus baseline
pub fn interpret(record: &FactRecord, baseline: &Baseline) -> Interpretation {
    let raw = metrics::raw_complexity(record);
    let relative = f64::from(raw) / baseline.avg_complexity.max(EPSILON);

    Interpretation {
        source: record.source.clone(),
        complexity_score: f64::from(raw),
        role: assign_role(record, baseline, relative),
        smells: detect_smells(record, relative),
        relative_complexity: relative,
    }
}

/// Later rules override earlier ones; the stub check always wins.
fn assign_role(record: &FactRecord, baseline: &Baseline, relative: f64) -> Role {
    let mut role = Role::Worker;
    if record.imports.len() as f64 > COORDINATOR_IMPORT_FACTOR * baseline.avg_imports {
        role = Role::Coordinator;
    }
    if relative > GOD_OBJECT_RELATIVE {
        role = Role::GodObjectCandidate;
    }
    if record.loc < STUB_MAX_LOC {
        role = Role::Stub;
    }
    role
}

fn detect_smells(record: &FactRecord, relative: f64) -> Vec<Smell> {
    let mut smells = Vec::new();

    if relative > EXCESSIVE_RELATIVE {
        smells.push(Smell::ExcessiveComplexity { relative });
    }
    if record.classes.len() > MIXED_MIN_CLASSES && record.functions.len() > MIXED_MIN_FUNCTIONS {
        smells.push(Smell::MixedResponsibilities);
    }

    for function in &record.functions {
        if function.branch_complexity > COMPLEX_FUNCTION_CC {
            smells.push(Smell::ComplexFunction {
                name: function.name.clone(),
                complexity: function.branch_complexity,
            });
        }
        if !function.has_docstring && function.branch_complexity > UNDOCUMENTED_FUNCTION_CC {
            smells.push(Smell::UndocumentedComplexFunction {
                name: function.name.clone(),
            });
        }
    }

    for class in &record.classes {
        if class.methods.len() > LARGE_CLASS_METHODS {
            smells.push(Smell::LargeClass {
                name: class.name.clone(),
                methods: class.methods.len(),
            });
        }
        for method in &class.methods {
            if method.branch_complexity > COMPLEX_FUNCTION_CC {
                smells.push(Smell::ComplexMethod {
                    class: class.name.clone(),
                    name: method.name.clone(),
                    complexity: method.branch_complexity,
                });
            }
        }
    }

    smells
}
