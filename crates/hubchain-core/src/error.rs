//! Error types for the hubchain resolver
//!
//! Provides the error enum for the two boundary operations with
//! human-readable messages and string serialization for JSON envelopes.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for hubchain resolver operations
///
/// Almost every failure inside a resolution chain is non-fatal and ends
/// up in the per-task event log instead of here. Only the initial fetch
/// of a source or file-host page, invalid caller input, or resolver
/// construction can produce one of these.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The source page itself could not be fetched
    #[error("Failed to fetch source page {url}: {reason}")]
    SourceUnreachable { url: String, reason: String },

    /// The file-host page for a media id could not be fetched
    #[error("Failed to fetch file host page {url}: {reason}")]
    FileHostUnreachable { url: String, reason: String },

    /// Invalid media id provided by the caller
    #[error("Invalid media id: {0}")]
    InvalidId(String),

    /// A configured extraction pattern failed to compile
    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(String),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl Serialize for ChainError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for hubchain operations
pub type Result<T> = std::result::Result<T, ChainError>;
