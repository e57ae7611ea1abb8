//! Steward Client - upstream HTTP clients
//!
//! This crate provides:
//! - A thin HTTP layer with per-request deadlines and status normalization
//! - Credential acquisition (client-credentials and session grants)
//! - Typed clients for the MDM, asset-management and NAC systems
//! - Wire models for every upstream payload Steward reads or writes

pub mod asset;
pub mod auth;
pub mod constants;
pub mod error;
pub mod http;
pub mod mdm;
pub mod model;
pub mod nac;

pub use asset::{AssetClient, AssetClientConfig, AssetSession};
pub use auth::ClientCredentials;
pub use error::{ClientError, Result};
pub use http::{HttpClientConfig, UpstreamHttpClient};
pub use mdm::{MdmClient, MdmClientConfig};
pub use model::*;
pub use nac::{NacClient, NacClientConfig};
