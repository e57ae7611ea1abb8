//! HTTP response types for Steward server
//!
//! Successful calls answer with the payload itself; failures with an
//! [`ErrorResult`] whose status mirrors the upstream failure where there is one.

use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

use steward_common::StewardError;

/// Error result for API error responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResult {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub code: i32,
    pub message: String,
    pub path: String,
}

impl ErrorResult {
    pub fn new(status: StatusCode, code: i32, message: String, path: &str) -> Self {
        ErrorResult {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or_default().to_string(),
            code,
            message,
            path: path.to_string(),
        }
    }

    pub fn from_error(err: &StewardError, path: &str) -> Self {
        Self::new(
            status_of(err),
            err.error_code().code,
            err.to_string(),
            path,
        )
    }

    pub fn http_response(err: &StewardError, path: &str) -> HttpResponse {
        HttpResponseBuilder::new(status_of(err)).json(Self::from_error(err, path))
    }

    pub fn not_found(path: &str) -> HttpResponse {
        HttpResponse::NotFound().json(Self::new(
            StatusCode::NOT_FOUND,
            steward_common::error::RESOURCE_NOT_FOUND.code,
            "Not found".to_string(),
            path,
        ))
    }
}

pub fn status_of(err: &StewardError) -> StatusCode {
    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Render an orchestration result: the payload as JSON, or the mapped error
pub fn json_response<T: Serialize>(
    req: &HttpRequest,
    result: steward_common::Result<T>,
) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(err) => {
            tracing::warn!(
                path = req.path(),
                status = err.http_status(),
                "Request failed: {}",
                err
            );
            ErrorResult::http_response(&err, req.path())
        }
    }
}
