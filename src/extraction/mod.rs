//! Structural extraction: source text → [`FactRecord`](crate::core::FactRecord).

pub mod extractor;
pub mod python;

pub use extractor::{extract_files, ExtractionBatch, SourceFile};
pub use python::{extract, try_extract};
