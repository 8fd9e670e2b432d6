//! Error types for acceleration-structure operations.

use thiserror::Error;

/// Errors raised by kd-tree construction, queries, and persistence.
#[derive(Error, Debug)]
pub enum KdTreeError {
    /// Build parameters outside their permitted domain.
    #[error("invalid build settings: {0}")]
    InvalidSettings(String),

    /// A leaf hook required by the query was not provided.
    #[error("leaf visitor does not implement {0}")]
    NotImplemented(&'static str),

    /// A persisted tree failed its structural invariants.
    #[error("corrupt tree data: {0}")]
    Corrupt(String),

    /// I/O error reading or writing a persisted tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
