use crate::core::{metrics, FactRecord};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVG_COMPLEXITY: f64 = 10.0;
pub const DEFAULT_AVG_IMPORTS: f64 = 5.0;

/// Corpus-wide averages used to normalize per-file scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub avg_complexity: f64,
    pub avg_imports: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            avg_complexity: DEFAULT_AVG_COMPLEXITY,
            avg_imports: DEFAULT_AVG_IMPORTS,
        }
    }
}

impl Baseline {
    /// Recompute from the full set of held records.
    ///
    /// An empty set yields the neutral defaults (10 / 5).
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FactRecord>,
    {
        let (count, complexity, imports) = records.into_iter().fold(
            (0usize, 0usize, 0usize),
            |(count, complexity, imports), record| {
                (
                    count + 1,
                    complexity + metrics::structural_complexity(record),
                    imports + record.imports.len(),
                )
            },
        );

        if count == 0 {
            return Self::default();
        }

        Self {
            avg_complexity: complexity as f64 / count as f64,
            avg_imports: imports as f64 / count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassFact, FunctionFact};

    #[test]
    fn test_empty_corpus_uses_defaults() {
        let baseline = Baseline::from_records(std::iter::empty());
        assert_eq!(baseline.avg_complexity, 10.0);
        assert_eq!(baseline.avg_imports, 5.0);
    }

    #[test]
    fn test_averages_over_records() {
        let a = FactRecord {
            source: "a.py".into(),
            imports: vec!["x".into(), "y".into()],
            functions: vec![FunctionFact::new("f").with_complexity(9)],
            classes: vec![ClassFact::new("A")],
            loc: 30,
        };
        let b = FactRecord {
            source: "b.py".into(),
            imports: vec![],
            ..Default::default()
        };

        let baseline = Baseline::from_records([&a, &b]);
        // Definition counts only: (1 + 1 + 2) and 0
        assert_eq!(baseline.avg_complexity, 2.0);
        assert_eq!(baseline.avg_imports, 1.0);
    }

    #[test]
    fn test_corpus_of_empty_records_averages_to_zero() {
        let records = vec![FactRecord::empty("a.py", 3)];
        let baseline = Baseline::from_records(&records);
        assert_eq!(baseline.avg_complexity, 0.0);
    }
}
