//! Error types for sourcesaver.
//!
//! Extraction itself never fails: every [`ParseError`] raised inside a stage
//! is downgraded to a dropped fragment plus a log line. [`SourceSaverError`]
//! covers the surfaces around the extractor that can genuinely fail, such as
//! loading configuration or persisting the search store.

use thiserror::Error;

/// The main error type for sourcesaver operations.
#[derive(Debug, Error)]
pub enum SourceSaverError {
    /// Configuration was rejected.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An export format name was not recognised.
    #[error("Unknown export format '{0}' (expected markdown, tsv or urls)")]
    UnknownExportFormat(String),
}

/// Error raised when an [`ExtractionConfig`](crate::config::ExtractionConfig) is invalid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid configuration: '{field}' {message}")]
pub struct ConfigError {
    /// The offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Why a candidate fragment or embedded string could not be parsed.
///
/// Never propagated out of an extraction call.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing to parse after trimming.
    #[error("Empty input")]
    Empty,

    /// The bracket scan found no opening bracket.
    #[error("No '[' or '{{' found")]
    NoOpeningBracket,

    /// The input ended before the brackets balanced.
    #[error("Unbalanced brackets: {open} still open at end of input")]
    Unbalanced {
        /// Brackets left open.
        open: usize,
    },

    /// The candidate exceeds the configured length ceiling.
    #[error("Candidate of {len} bytes exceeds limit of {limit}")]
    TooLarge {
        /// Trimmed candidate length.
        len: usize,
        /// Configured ceiling.
        limit: usize,
    },
}

impl ParseError {
    /// Short machine-readable reason used in events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "invalid_json",
            Self::Empty => "empty",
            Self::NoOpeningBracket => "no_opening_bracket",
            Self::Unbalanced { .. } => "unbalanced",
            Self::TooLarge { .. } => "too_large",
        }
    }
}
