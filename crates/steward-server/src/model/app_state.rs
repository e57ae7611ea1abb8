//! Application state management
//!
//! Every handler reaches the upstreams through the orchestrators held here.
//! The state is built once at startup from the gateways and never mutated.

use std::sync::Arc;

use anyhow::Context;

use steward_client::{AssetClient, MdmClient, NacClient};
use steward_core::{
    AssetGateway, DeviceQueryHandler, InventoryUpdater, MdmGateway, NacGateway,
    OrchestrationConfig, PrestageOrchestrator, ResourceLocator, RetirementOrchestrator,
    ScopeLocks,
};

use super::config::Configuration;

/// Upstream gateways the application runs against
#[derive(Clone)]
pub struct Gateways {
    pub mdm: Arc<dyn MdmGateway>,
    /// Absent when asset-state sync is disabled
    pub asset: Option<Arc<dyn AssetGateway>>,
    pub nac: Arc<dyn NacGateway>,
}

impl Gateways {
    /// Build the HTTP-backed gateways from configuration
    pub fn from_configuration(configuration: &Configuration) -> anyhow::Result<Self> {
        let mdm = MdmClient::new(configuration.mdm_client_config()?)
            .context("failed to build MDM client")?;
        let asset = match configuration.asset_client_config()? {
            Some(config) => {
                let client = AssetClient::new(config).context("failed to build asset client")?;
                Some(Arc::new(client) as Arc<dyn AssetGateway>)
            }
            None => None,
        };
        let nac = NacClient::new(configuration.nac_client_config()?)
            .context("failed to build NAC client")?;

        Ok(Self {
            mdm: Arc::new(mdm),
            asset,
            nac: Arc::new(nac),
        })
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub locator: ResourceLocator,
    pub prestage: PrestageOrchestrator,
    pub retirement: RetirementOrchestrator,
    pub query: DeviceQueryHandler,
    pub inventory: InventoryUpdater,
}

impl AppState {
    pub fn new(gateways: Gateways, config: &OrchestrationConfig) -> Self {
        let deadline = config.operation_timeout;
        Self {
            locator: ResourceLocator::new(gateways.mdm.clone()),
            prestage: PrestageOrchestrator::new(gateways.mdm.clone(), ScopeLocks::new(), deadline),
            retirement: RetirementOrchestrator::new(
                gateways.mdm.clone(),
                gateways.asset,
                gateways.nac,
                config,
            ),
            query: DeviceQueryHandler::new(gateways.mdm.clone(), deadline),
            inventory: InventoryUpdater::new(gateways.mdm, deadline),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
