//! Utilities shared across the fragmap codebase.

pub mod cancel;

pub use cancel::CancellationToken;
