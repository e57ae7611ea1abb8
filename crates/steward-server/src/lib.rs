// Main library module for Steward - device lifecycle orchestration across MDM, asset and NAC systems

pub mod api; // API handlers and request models
pub mod model; // Configuration, application state and response types
pub mod startup; // Logging, HTTP server and shutdown

pub use model::{AppState, Configuration, ErrorResult, Gateways};
