//! Parallel extraction over a snapshot of source files.
//!
//! Each file is read and parsed independently on the rayon pool. The caller
//! receives all records at once and merges them into the corpus from a single
//! thread, so no shared map is written concurrently.

use crate::common::CancellationToken;
use crate::core::FactRecord;
use crate::extraction::python;
use rayon::prelude::*;
use std::path::PathBuf;

/// A file to extract, with the identifier it is recorded under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Identifier used as the record's `source` (path relative to the ingestion root)
    pub source: String,
    pub path: PathBuf,
}

/// Outcome of one extraction pass
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    pub records: Vec<FactRecord>,
    /// Files that could not be read, with the reason
    pub unreadable: Vec<(String, String)>,
    /// Files skipped because the pass was cancelled
    pub skipped: usize,
}

impl ExtractionBatch {
    pub fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }
}

enum FileOutcome {
    Extracted(FactRecord),
    Unreadable(String, String),
    Skipped,
}

/// Read and extract every file in parallel.
///
/// Parse failures are absorbed by the extractor; read failures are reported
/// in [`ExtractionBatch::unreadable`] and never abort the batch.
pub fn extract_files(files: &[SourceFile], cancel: &CancellationToken) -> ExtractionBatch {
    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| {
            if cancel.is_cancelled() {
                return FileOutcome::Skipped;
            }
            match std::fs::read_to_string(&file.path) {
                Ok(content) => FileOutcome::Extracted(python::extract(&file.source, &content)),
                Err(e) => {
                    log::warn!("Failed to read {}: {}", file.path.display(), e);
                    FileOutcome::Unreadable(file.source.clone(), e.to_string())
                }
            }
        })
        .collect();

    outcomes
        .into_iter()
        .fold(ExtractionBatch::default(), |mut batch, outcome| {
            match outcome {
                FileOutcome::Extracted(record) => batch.records.push(record),
                FileOutcome::Unreadable(source, reason) => batch.unreadable.push((source, reason)),
                FileOutcome::Skipped => batch.skipped += 1,
            }
            batch
        })
}
