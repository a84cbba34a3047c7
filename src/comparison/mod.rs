//! Structural comparison of two ingested files.

mod comparator;

pub use comparator::{compare, ComparisonResult, DiffPoint, Winner};
