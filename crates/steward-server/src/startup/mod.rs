//! Application startup utilities module.

mod http;
mod logging;
mod shutdown;

pub use http::{cors_headers, fallback, http_server};
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{ShutdownSignal, stop_on_signal, wait_for_shutdown_signal};
