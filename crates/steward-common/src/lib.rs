//! Steward Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Steward components:
//! - The request-level error taxonomy and API error codes
//! - Display sentinels shared by the query and orchestration layers
//! - Small helpers for normalizing technician input

pub mod constants;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ErrorCode, Result, StewardError};
pub use utils::{is_placeholder, normalize_mac_addresses};
