//! Property-based tests for the scoring pipeline
//!
//! These tests verify invariants that should hold for all inputs:
//! - Every extracted function and method has branch complexity of at least 1
//! - Judgement confidence stays within [0, 0.95]
//! - Risk classification is total and respects the tier thresholds
//! - Policy health never increases as violations are added

use fragmap::core::{ClassFact, FactRecord, FunctionFact};
use fragmap::extraction::extract;
use fragmap::heuristics::{interpret, Baseline, Role};
use fragmap::judgement::assess;
use fragmap::policy::{health_score, PolicyRule, Severity, Violation};
use fragmap::risk::{classify, Classification};
use proptest::prelude::*;

fn statement(depth: usize) -> impl Strategy<Value = String> {
    let indent = "    ".repeat(depth);
    prop_oneof![
        Just(format!("{indent}x = 1\n")),
        Just(format!("{indent}if x:\n{indent}    x = 2\n")),
        Just(format!("{indent}for i in range(3):\n{indent}    x += i\n")),
        Just(format!("{indent}while x > 0 and x < 10:\n{indent}    x -= 1\n")),
        Just(format!("{indent}try:\n{indent}    x = 1\n{indent}except Exception:\n{indent}    pass\n")),
    ]
}

fn python_function(name: String, depth: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(statement(depth + 1), 0..6).prop_map(move |body| {
        let indent = "    ".repeat(depth);
        let body = if body.is_empty() {
            format!("{indent}    pass\n")
        } else {
            body.concat()
        };
        format!("{indent}def {name}(x):\n{body}\n")
    })
}

fn python_module() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(python_function("top".to_string(), 0), 0..4),
        prop::collection::vec(python_function("method".to_string(), 1), 0..4),
    )
        .prop_map(|(functions, methods)| {
            let mut source = functions.concat();
            if !methods.is_empty() {
                source.push_str("class Holder:\n");
                source.push_str(&methods.concat());
            }
            source
        })
}

fn fact_record() -> impl Strategy<Value = FactRecord> {
    (
        0usize..2000,
        prop::collection::vec("[a-z]{1,8}", 0..15),
        prop::collection::vec((1u32..30, any::<bool>()), 0..25),
        prop::collection::vec(0usize..30, 0..6),
    )
        .prop_map(|(loc, imports, functions, classes)| FactRecord {
            source: "generated.py".to_string(),
            imports,
            functions: functions
                .into_iter()
                .enumerate()
                .map(|(i, (cc, doc))| {
                    FunctionFact::new(format!("f{i}"))
                        .with_complexity(cc)
                        .with_docstring(doc)
                })
                .collect(),
            classes: classes
                .into_iter()
                .enumerate()
                .map(|(i, methods)| {
                    ClassFact::new(format!("C{i}"))
                        .with_methods((0..methods).map(|m| FunctionFact::new(format!("m{m}"))).collect())
                })
                .collect(),
            loc,
        })
}

fn violation(severity: Severity) -> Violation {
    Violation {
        rule: PolicyRule::MaxLoc,
        message: String::new(),
        severity,
        target: "x.py".to_string(),
        mitigation: String::new(),
    }
}

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Advisory),
        Just(Severity::Warning),
        Just(Severity::Critical),
        Just(Severity::Blocker),
    ]
}

proptest! {
    #[test]
    fn prop_extracted_complexity_is_at_least_one(source in python_module()) {
        let record = extract("generated.py", &source);
        for function in &record.functions {
            prop_assert!(function.branch_complexity >= 1);
        }
        for (_, method) in record.methods() {
            prop_assert!(method.branch_complexity >= 1);
        }
    }

    #[test]
    fn prop_arbitrary_text_never_panics(source in "\\PC{0,200}") {
        let record = extract("noise.py", &source);
        prop_assert!(record.functions.iter().all(|f| f.branch_complexity >= 1));
    }

    #[test]
    fn prop_confidence_is_bounded(
        record in fact_record(),
        avg_complexity in 0.0f64..100.0,
        avg_imports in 0.0f64..20.0,
    ) {
        let baseline = Baseline { avg_complexity, avg_imports };
        let interpretation = interpret(&record, &baseline);
        let judgement = assess(&interpretation);
        prop_assert!((0.0..=0.95).contains(&judgement.confidence));
        if record.loc < 10 {
            prop_assert_eq!(interpretation.role, Role::Stub);
        }
    }

    #[test]
    fn prop_interpretation_is_deterministic(record in fact_record()) {
        let baseline = Baseline::from_records([&record]);
        prop_assert_eq!(interpret(&record, &baseline), interpret(&record, &baseline));
    }

    #[test]
    fn prop_classification_respects_thresholds(total in 0.0f64..=100.0, criticality in 0.0f64..=1.0) {
        let classification = classify(total, criticality);
        let expected = if total > 75.0 {
            Classification::Red
        } else if total > 50.0 {
            Classification::Orange
        } else if total > 25.0 {
            Classification::Yellow
        } else if criticality > 0.6 {
            Classification::Blue
        } else {
            Classification::Green
        };
        prop_assert_eq!(classification, expected);
    }

    #[test]
    fn prop_health_is_monotone(severities in prop::collection::vec(severity(), 0..20)) {
        let mut violations = Vec::new();
        let mut previous = health_score(&violations);
        prop_assert_eq!(previous, 100.0);
        for severity in severities {
            violations.push(violation(severity));
            let current = health_score(&violations);
            prop_assert!(current <= previous);
            prop_assert!((0.0..=100.0).contains(&current));
            previous = current;
        }
    }
}
