//! Error types for fragmap operations.
//!
//! Every failure in the analysis pipeline falls into one of a handful of
//! categories. Most are recovered locally at a designated point and never
//! reach the caller:
//!
//! - `ParseFailure`: malformed source. The extractor logs it and yields an
//!   empty-but-valid [`FactRecord`](crate::core::FactRecord).
//! - `ExternalMetricUnavailable`: version-control query failed or timed out.
//!   Risk scoring substitutes zero-valued metrics.
//! - `StoreWriteFailure`: persistence unavailable. The engine keeps going
//!   in-memory and flags the result as degraded.
//!
//! `PathNotFound` and `Config` are surfaced to the caller as-is.
//!
//! # Example
//!
//! ```rust
//! use fragmap::errors::FragmapError;
//!
//! let err = FragmapError::store("database is locked");
//! assert!(err.is_recoverable());
//! assert!(!FragmapError::PathNotFound("missing".into()).is_recoverable());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fragmap operations
#[derive(Debug, Error)]
pub enum FragmapError {
    /// Source text could not be parsed
    #[error("Parse failure in {source_id}: {message}")]
    ParseFailure { source_id: String, message: String },

    /// Ingestion target does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Version-control or other external metric query failed or timed out
    #[error("External metric unavailable: {0}")]
    ExternalMetricUnavailable(String),

    /// Persistence layer rejected a read or write
    #[error("Store write failure: {0}")]
    StoreWriteFailure(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Encoding or decoding of persisted values failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FragmapError {
    /// Create a parse failure for a source identifier
    pub fn parse(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create an external metric error
    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalMetricUnavailable(message.into())
    }

    /// Create a store failure from any displayable backend error
    pub fn store(message: impl ToString) -> Self {
        Self::StoreWriteFailure(message.to_string())
    }

    /// Create a serialization error
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Whether the pipeline recovers from this error without failing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParseFailure { .. }
                | Self::ExternalMetricUnavailable(_)
                | Self::StoreWriteFailure(_)
                | Self::Serialization(_)
        )
    }
}

impl From<git2::Error> for FragmapError {
    fn from(err: git2::Error) -> Self {
        Self::ExternalMetricUnavailable(err.message().to_string())
    }
}

impl From<redb::Error> for FragmapError {
    fn from(err: redb::Error) -> Self {
        Self::store(err)
    }
}

impl From<redb::DatabaseError> for FragmapError {
    fn from(err: redb::DatabaseError) -> Self {
        Self::store(err)
    }
}

impl From<redb::TransactionError> for FragmapError {
    fn from(err: redb::TransactionError) -> Self {
        Self::store(err)
    }
}

impl From<redb::TableError> for FragmapError {
    fn from(err: redb::TableError) -> Self {
        Self::store(err)
    }
}

impl From<redb::StorageError> for FragmapError {
    fn from(err: redb::StorageError) -> Self {
        Self::store(err)
    }
}

impl From<redb::CommitError> for FragmapError {
    fn from(err: redb::CommitError) -> Self {
        Self::store(err)
    }
}

impl From<postcard::Error> for FragmapError {
    fn from(err: postcard::Error) -> Self {
        Self::serialization(err)
    }
}

/// Result type alias for fragmap operations
pub type Result<T> = std::result::Result<T, FragmapError>;
