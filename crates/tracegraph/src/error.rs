//! Error types for Tracegraph operations.
//!
//! This module provides the main error type [`TracegraphError`] which wraps
//! the conditions that can occur around a layout: reading input, decoding a
//! trace document, loading configuration, and encoding the result. The
//! layout itself cannot fail.

use std::io;

use thiserror::Error;

/// The main error type for Tracegraph operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source document next to the decoder error
/// so that callers can point at the offending line and column.
#[derive(Debug, Error)]
pub enum TracegraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid trace document: {err}")]
    Parse { err: serde_json::Error, src: String },

    #[error("Invalid trace record: {0}")]
    Trace(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl TracegraphError {
    /// Create a new `Parse` error with the associated source document.
    pub fn new_parse_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
