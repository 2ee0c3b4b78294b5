//! Error types for publication ingestion and enrichment.

use std::time::Duration;

/// Errors that can occur while loading, normalizing, or enriching publications.
#[derive(Debug, thiserror::Error)]
pub enum PublistError {
    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The citation service returned an error status code.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the citation service (HTTP 429).
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Resource not found (HTTP 404, unknown detail id, missing file).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response or input document.
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// A BibTeX entry could not be parsed or lacks a required field.
    #[error("BibTeX entry {index}: {message}")]
    Bibtex { index: usize, message: String },

    /// A citation record cannot be turned into a publication.
    #[error("Invalid record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for Results using [`PublistError`].
pub type Result<T> = std::result::Result<T, PublistError>;
