//! Common error types for WQM

use thiserror::Error;

/// Common result type for WQM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the WQM crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON payload could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
