//! Error types for wqm-ui
//!
//! Every variant is shown to the user through [`TriageError::user_message`].
//! Cancelling a coordinate prompt is not an error and has no variant here.

use thiserror::Error;

/// Failures of a reconciliation cycle or a tagging attempt
#[derive(Debug, Error)]
pub enum TriageError {
    /// Service answered with a non-success status
    #[error("HTTP error: {status} {reason}")]
    Transport { status: u16, reason: String },

    /// Request never got a response (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Fetched payload is not a sequence of readings
    #[error("Schema error: {0}")]
    Schema(String),

    /// Input rejected before contacting the service
    #[error("Validation error: {0}")]
    Validation(String),

    /// Service rejected a coordinate update
    #[error("Update rejected: {0}")]
    Update(String),
}

impl TriageError {
    /// Text shown in the notice area
    pub fn user_message(&self) -> String {
        match self {
            TriageError::Transport { status, reason } => {
                format!("Failed to load data. HTTP Error: {} {}.", status, reason)
            }
            TriageError::Network(_) => {
                "Failed to load water quality data. Check network connection or console.".to_string()
            }
            TriageError::Schema(_) => "Failed to load data. Check permissions.".to_string(),
            TriageError::Validation(msg) => msg.clone(),
            TriageError::Update(msg) => format!("Error: {}", msg),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TriageError::Validation(_))
    }
}

/// Result type for wqm-ui operations
pub type TriageResult<T> = Result<T, TriageError>;
