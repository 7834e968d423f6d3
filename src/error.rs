//! Typed errors for the enrichment core.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Empty sequence set: {0}")]
    EmptySequenceSet(String),

    #[error("No motifs or clusters resolved")]
    NoMotifs,

    #[error("Invalid matrix for '{id}': {message}")]
    InvalidMatrix { id: String, message: String },

    #[error("Invalid threshold '{0}': expected a fraction (0.8) or percentage (\"80%\")")]
    InvalidThreshold(String),

    #[error("Unknown TF or cluster id: {0}")]
    UnknownId(String),

    #[error("Total {0} length is zero; cannot compute rates")]
    ZeroTotalLength(&'static str),

    #[error("Fisher and Z-score result sets disagree on id: {0}")]
    ResultMismatch(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),
}

impl EnrichError {
    /// Create a new InvalidMatrix error.
    pub fn invalid_matrix(id: impl Into<String>, message: impl Into<String>) -> Self {
        EnrichError::InvalidMatrix {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, EnrichError>;
