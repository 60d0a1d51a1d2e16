//! Azure backend error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Azure API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AzureError> for mirrorflow_cloud::CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::NotFound(id) => mirrorflow_cloud::CloudError::ResourceNotFound(id),
            e @ AzureError::MissingEnvVar(_) => {
                mirrorflow_cloud::CloudError::AuthenticationFailed(e.to_string())
            }
            other => mirrorflow_cloud::CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
