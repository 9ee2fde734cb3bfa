//! Error types used throughout the application
//!
//! Every classified error carries enough information to derive an
//! HTTP-equivalent status code and a retryable flag; callers decide severity
//! from the classification, never from string matching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for calbridge
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "message")]
pub enum CalbridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate resource: {0}")]
    DuplicateResource(String),

    #[error("Provider error ({status}): {detail}")]
    Provider { status: u16, detail: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CalbridgeError {
    /// HTTP-equivalent status code for this classification.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Auth(_) => 401,
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) | Self::DuplicateResource(_) => 400,
            Self::Provider { status, .. } => *status,
            Self::Config(_) | Self::Network(_) | Self::Persistence(_) | Self::Internal(_) => 500,
        }
    }

    /// Whether the caller may usefully retry the failed operation.
    ///
    /// Only transport-level failures are retryable; validation, invariant and
    /// persistence failures need remediation, not a retry.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for calbridge operations
pub type Result<T> = std::result::Result<T, CalbridgeError>;
