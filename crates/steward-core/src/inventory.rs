//! Inventory update workflow
//!
//! A technician edit lands in the preload record first, then, when the device
//! is already enrolled, in its inventory detail. Only the preload write is
//! required.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use steward_client::{InventoryGeneralUpdate, InventoryUpdate, PreloadPayload, UserAndLocation};
use steward_common::constants::COMPUTER_UPDATE_FAILED;
use steward_common::{Result, StewardError, is_placeholder};

use crate::deadline::within;
use crate::model::{DeviceUpdate, InventoryUpdateOutcome};
use crate::upstream::MdmGateway;

#[derive(Clone)]
pub struct InventoryUpdater {
    mdm: Arc<dyn MdmGateway>,
    deadline: Duration,
}

impl InventoryUpdater {
    pub fn new(mdm: Arc<dyn MdmGateway>, deadline: Duration) -> Self {
        Self { mdm, deadline }
    }

    /// Upsert the preload record, then patch the enrolled computer if known
    ///
    /// The preload is replaced when `preload_id` is given and created
    /// otherwise. A failed inventory patch is reported in the outcome rather
    /// than as an error.
    #[instrument(skip(self, update), fields(serial_number = %update.serial_number))]
    pub async fn update_device_info(
        &self,
        preload_id: Option<i64>,
        computer_id: Option<i64>,
        update: &DeviceUpdate,
    ) -> Result<InventoryUpdateOutcome> {
        if is_placeholder(&update.serial_number) {
            return Err(StewardError::IllegalArgument(
                "serial number is required".to_string(),
            ));
        }
        within(
            self.deadline,
            "inventory update",
            self.apply(preload_id, computer_id, update),
        )
        .await
    }

    async fn apply(
        &self,
        preload_id: Option<i64>,
        computer_id: Option<i64>,
        update: &DeviceUpdate,
    ) -> Result<InventoryUpdateOutcome> {
        let payload = preload_payload(update);
        let preload = match preload_id {
            Some(id) => self.mdm.replace_preload(id, &payload).await?,
            None => self.mdm.create_preload(&payload).await?,
        };
        info!(preload_id, "Preload record saved");

        let Some(computer_id) = computer_id else {
            return Ok(InventoryUpdateOutcome {
                preload,
                computer: None,
                error: None,
            });
        };

        match self
            .mdm
            .update_inventory_detail(computer_id, &inventory_update(update))
            .await
        {
            Ok(computer) => Ok(InventoryUpdateOutcome {
                preload,
                computer: Some(computer),
                error: None,
            }),
            Err(e) => {
                warn!(computer_id, "Inventory detail patch failed: {}", e);
                Ok(InventoryUpdateOutcome {
                    preload,
                    computer: None,
                    error: Some(COMPUTER_UPDATE_FAILED.to_string()),
                })
            }
        }
    }
}

fn preload_payload(update: &DeviceUpdate) -> PreloadPayload {
    PreloadPayload {
        username: update.username.clone(),
        email_address: update.email_address.clone(),
        building: update.building.clone(),
        room: update.room.clone(),
        asset_tag: update.asset_tag.clone(),
        ..PreloadPayload::computer(&update.serial_number)
    }
}

fn inventory_update(update: &DeviceUpdate) -> InventoryUpdate {
    InventoryUpdate {
        general: InventoryGeneralUpdate {
            asset_tag: update.asset_tag.clone(),
        },
        user_and_location: UserAndLocation {
            username: update.username.clone(),
            email: update.email_address.clone(),
            building_id: update.building_id,
            room: update.room.clone(),
        },
    }
}
