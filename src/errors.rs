//! Error types for topic_consensus
//!
//! Every failure here is a precondition violation detected locally. Errors are
//! returned immediately; nothing in the crate retries or degrades to a
//! best-effort score.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Main error type for topic_consensus
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    /// An empty ranking, ranking set or cost matrix was supplied
    #[error("Empty input: {message}")]
    EmptyInput { message: String },

    /// Matrix shape disagrees with the inputs that produced it
    #[error("Dimension mismatch: expected {expected_rows}x{expected_cols}, found {rows}x{cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Negative or non-finite cost, rank below 1, bad log base
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Consensus rankings requested before any ranking set was added
    #[error("Topic ensemble is uninitialized: no ranking set has been added")]
    UninitializedEnsemble,

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ConsensusError {
    /// Create an empty input error
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        (expected_rows, expected_cols): (usize, usize),
        (rows, cols): (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            expected_rows,
            expected_cols,
            rows,
            cols,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error was caused by empty input
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput { .. })
    }
}

impl From<serde_json::Error> for ConsensusError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
