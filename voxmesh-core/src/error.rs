//! Error types for voxmesh

use thiserror::Error;

/// Main error type for voxmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Inconsistent mesh: {0}")]
    InconsistentMesh(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for voxmesh operations
pub type Result<T> = std::result::Result<T, Error>;
