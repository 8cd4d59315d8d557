//! Error types shared across the crate.
use thiserror::Error;

/// Errors surfaced by layer and network operations.
///
/// Everything here is either a caller mistake (wrong vector sizes, impossible
/// configurations) or a persistence failure. Nothing is retried or recovered
/// internally; computation itself is deterministic and total.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector length disagrees with the configured dimensions.
    #[error("{what}: expected length {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A layer or network cannot be built as requested.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A data file could not be interpreted.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
