//! Error types for the codec

use std::io;
use thiserror::Error;

/// Result type alias using [`HuffmanError`]
pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Error, Debug)]
pub enum HuffmanError {
    /// Source or sink unavailable, or failed mid-read/write
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persisted frequency table is malformed or does not match the payload
    #[error("malformed frequency table: {0}")]
    Format(String),

    /// Payload ended while the decoder was part way through a code
    #[error("truncated stream: {0}")]
    TruncatedStream(String),

    /// Programming defect: a lookup that the codec's own contracts guarantee
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl HuffmanError {
    /// Format error pinned to a 1-based line of the persisted table
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        HuffmanError::Format(format!("line {}: {}", line, reason.into()))
    }

    pub fn truncated(msg: impl Into<String>) -> Self {
        HuffmanError::TruncatedStream(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        HuffmanError::InternalInvariant(msg.into())
    }
}
