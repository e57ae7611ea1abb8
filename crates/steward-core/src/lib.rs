//! Steward Core - device lifecycle orchestration
//!
//! This crate provides:
//! - Gateway traits over the MDM, asset-management and NAC systems
//! - Resource locators resolving serials and prestage names to upstream ids
//! - The prestage reassignment orchestrator
//! - The device retirement saga
//! - The aggregating device query and the inventory update workflow

pub mod config;
pub mod deadline;
pub mod inventory;
pub mod locator;
pub mod lock;
pub mod model;
pub mod prestage;
pub mod query;
pub mod retirement;
pub mod upstream;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::OrchestrationConfig;
pub use inventory::InventoryUpdater;
pub use locator::ResourceLocator;
pub use lock::ScopeLocks;
pub use model::*;
pub use prestage::PrestageOrchestrator;
pub use query::DeviceQueryHandler;
pub use retirement::RetirementOrchestrator;
pub use upstream::{AssetGateway, MdmGateway, NacGateway};
