//! Deadline helpers
//!
//! Dropping a timed-out future cancels every upstream call still pending
//! inside it, including fan-out branches.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout, timeout_at};
use tracing::warn;

use steward_common::{Result, StewardError};

/// Run `operation` under an overall deadline.
pub async fn within<F, T>(limit: Duration, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Operation deadline elapsed");
            Err(StewardError::Timeout(operation.to_string()))
        }
    }
}

/// Run one step against an absolute deadline shared by a whole saga.
pub async fn until<F, T>(deadline: Instant, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout_at(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, "Operation deadline elapsed");
            Err(StewardError::Timeout(operation.to_string()))
        }
    }
}
