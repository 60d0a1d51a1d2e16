//! Core error types

use thiserror::Error;

/// Errors surfaced by the resource backend and the sequencer
#[derive(Error, Debug)]
pub enum CloudError {
    /// The queried resource does not exist. Backends must reserve this
    /// variant for a definitive not-found answer from the management plane;
    /// transport faults and throttling belong in `ApiError`.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether this error is a definitive "the resource is gone" answer.
    ///
    /// The absence waiter keys off this instead of treating every query
    /// failure as deletion confirmation.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::ResourceNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
