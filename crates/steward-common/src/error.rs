//! Error types and error codes for Steward
//!
//! This module defines:
//! - `StewardError`: the error taxonomy every orchestration surfaces
//! - `ErrorCode`: structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Request-level error taxonomy.
///
/// Upstream messages are carried verbatim so the operator sees what the
/// upstream system actually said.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StewardError {
    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ConflictError(String),

    #[error("{message}")]
    UpstreamError { status: Option<u16>, message: String },

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl StewardError {
    pub fn not_found(message: impl Into<String>) -> Self {
        StewardError::NotFound(message.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        StewardError::UpstreamError {
            status,
            message: message.into(),
        }
    }

    /// Prefix the message with `context`, keeping the variant and status.
    pub fn context(self, context: &str) -> Self {
        let prefix = |message: String| format!("{}: {}", context, message);
        match self {
            StewardError::AuthError(m) => StewardError::AuthError(prefix(m)),
            StewardError::NotFound(m) => StewardError::NotFound(prefix(m)),
            StewardError::ConflictError(m) => StewardError::ConflictError(prefix(m)),
            StewardError::UpstreamError { status, message } => StewardError::UpstreamError {
                status,
                message: prefix(message),
            },
            StewardError::Timeout(m) => StewardError::Timeout(prefix(m)),
            StewardError::IllegalArgument(m) => StewardError::IllegalArgument(prefix(m)),
            StewardError::InternalError(m) => StewardError::InternalError(prefix(m)),
        }
    }

    /// HTTP status reported to the caller.
    ///
    /// Upstream failures mirror the upstream status when it is itself an
    /// error status; anything else collapses to 500.
    pub fn http_status(&self) -> u16 {
        match self {
            StewardError::AuthError(_) => 500,
            StewardError::NotFound(_) => 404,
            StewardError::ConflictError(_) => 400,
            StewardError::UpstreamError { status, .. } => match status {
                Some(code) if (400..600).contains(code) => *code,
                _ => 500,
            },
            StewardError::Timeout(_) => 504,
            StewardError::IllegalArgument(_) => 400,
            StewardError::InternalError(_) => 500,
        }
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            StewardError::AuthError(_) => AUTH_FAILED,
            StewardError::NotFound(_) => RESOURCE_NOT_FOUND,
            StewardError::ConflictError(_) => SCOPE_CONFLICT,
            StewardError::UpstreamError { .. } => UPSTREAM_ERROR,
            StewardError::Timeout(_) => UPSTREAM_TIMEOUT,
            StewardError::IllegalArgument(_) => PARAMETER_VALIDATE_ERROR,
            StewardError::InternalError(_) => SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, StewardError>;

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const SCOPE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "prestage scope conflict",
};

pub const AUTH_FAILED: ErrorCode<'static> = ErrorCode {
    code: 30001,
    message: "upstream authentication failed",
};

pub const UPSTREAM_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30002,
    message: "upstream error",
};

pub const UPSTREAM_TIMEOUT: ErrorCode<'static> = ErrorCode {
    code: 30003,
    message: "upstream timeout",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
