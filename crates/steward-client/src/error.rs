//! Client error types for the upstream clients

use steward_common::StewardError;

/// Errors raised by a single upstream call
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected status {status}, expected {expected}")]
    UnexpectedStatus { status: u16, expected: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    /// Upstream HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::UnexpectedStatus { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Upstream response body or error text, for passing through to operators.
    pub fn upstream_message(&self) -> String {
        match self {
            ClientError::Status { status, body } if body.trim().is_empty() => {
                format!("upstream returned status {}", status)
            }
            ClientError::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ClientError> for StewardError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Auth(message) => StewardError::AuthError(message),
            ClientError::Timeout => StewardError::Timeout("upstream request".to_string()),
            other => StewardError::upstream(other.status(), other.upstream_message()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
