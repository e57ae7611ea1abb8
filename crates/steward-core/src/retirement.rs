//! Device retirement saga
//!
//! Steps run in order: wipe, inventory deletion, then asset-state sync and
//! NAC cleanup concurrently. Wipe and deletion are required: a failure stops
//! the saga and nothing after it is called. The last two are advisory. There
//! is no rollback; a wiped device cannot be un-wiped.

use std::sync::Arc;
use std::time::Duration;

use futures::TryFutureExt;
use futures::future::join_all;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{Instrument, error, info, instrument, warn};

use steward_client::AssetSession;
use steward_common::{Result, StewardError, normalize_mac_addresses};

use crate::config::OrchestrationConfig;
use crate::deadline::{until, within};
use crate::model::{RetirementOutcome, RetirementStep, StepReport, StepResult, WipeResult};
use crate::upstream::{AssetGateway, MdmGateway, NacGateway};

#[derive(Clone)]
pub struct RetirementOrchestrator {
    mdm: Arc<dyn MdmGateway>,
    asset: Option<Arc<dyn AssetGateway>>,
    nac: Arc<dyn NacGateway>,
    retired_state_id: i64,
    deadline: Duration,
}

impl RetirementOrchestrator {
    /// `asset` is `None` when the deployment has no asset-system sync
    pub fn new(
        mdm: Arc<dyn MdmGateway>,
        asset: Option<Arc<dyn AssetGateway>>,
        nac: Arc<dyn NacGateway>,
        config: &OrchestrationConfig,
    ) -> Self {
        Self {
            mdm,
            asset,
            nac,
            retired_state_id: config.retired_state_id,
            deadline: config.operation_timeout,
        }
    }

    /// Send the remote wipe command alone
    ///
    /// The command runs on its own task, so dropping the caller does not
    /// cancel it once sent.
    #[instrument(skip(self))]
    pub async fn wipe_device(&self, computer_id: i64) -> Result<WipeResult> {
        let mdm = self.mdm.clone();
        let deadline = self.deadline;
        let task = tokio::spawn(
            async move {
                let erase = mdm.erase_computer(computer_id).map_err(StewardError::from);
                within(deadline, "device wipe", erase).await
            }
            .in_current_span(),
        );
        let response = task.await.map_err(|e| join_error("device wipe", e))??;
        info!("Wipe command accepted for computer {}", computer_id);
        Ok(WipeResult {
            computer_id,
            response,
        })
    }

    /// Run the full retirement saga for one device
    ///
    /// MAC addresses are normalized first; placeholders and duplicates are
    /// dropped. The outcome always lists every step, including the ones that
    /// were skipped after an abort.
    ///
    /// The saga runs on its own task: a caller that stops waiting (a client
    /// disconnect) does not leave a wiped device half retired.
    #[instrument(skip(self, mac_addresses))]
    pub async fn retire_device(
        &self,
        computer_id: i64,
        serial_number: &str,
        mac_addresses: &[String],
    ) -> Result<RetirementOutcome> {
        if steward_common::is_placeholder(serial_number) {
            return Err(StewardError::IllegalArgument(
                "serial number is required".to_string(),
            ));
        }
        let saga = self.clone();
        let serial_number = serial_number.to_string();
        let mac_addresses = normalize_mac_addresses(mac_addresses);
        let task = tokio::spawn(
            async move {
                saga.run_saga(computer_id, &serial_number, mac_addresses).await
            }
            .in_current_span(),
        );
        task.await.map_err(|e| join_error("device retirement", e))
    }

    async fn run_saga(
        &self,
        computer_id: i64,
        serial_number: &str,
        mac_addresses: Vec<String>,
    ) -> RetirementOutcome {
        let deadline = Instant::now() + self.deadline;
        let mut steps = Vec::with_capacity(4 + mac_addresses.len());

        // Step 1: wipe
        let wipe = self.mdm.erase_computer(computer_id).map_err(StewardError::from);
        match until(deadline, "device wipe", wipe).await {
            Ok(_) => {
                info!(step = "wipe", "Wipe command accepted for computer {}", computer_id);
                steps.push(StepReport::new(RetirementStep::Wipe, StepResult::Succeeded));
            }
            Err(e) => {
                error!(
                    step = "wipe",
                    "Wipe failed for computer {}, aborting: {}", computer_id, e
                );
                steps.push(StepReport::new(
                    RetirementStep::Wipe,
                    StepResult::failed(RetirementStep::Wipe, e),
                ));
                skip_remaining(
                    &mut steps,
                    &mac_addresses,
                    self.asset.is_some(),
                    "wipe failed",
                );
                return RetirementOutcome::new(computer_id, serial_number, steps);
            }
        }

        // Step 2: inventory deletion
        let deletion = self.mdm.delete_computer(computer_id).map_err(StewardError::from);
        match until(deadline, "inventory deletion", deletion).await {
            Ok(()) => {
                info!(
                    step = "inventoryDeletion",
                    "Computer {} deleted from inventory", computer_id
                );
                steps.push(StepReport::new(
                    RetirementStep::InventoryDeletion,
                    StepResult::Succeeded,
                ));
            }
            Err(e) => {
                error!(
                    step = "inventoryDeletion",
                    "Computer {} was wiped but is still in inventory: {}", computer_id, e
                );
                steps.push(StepReport::new(
                    RetirementStep::InventoryDeletion,
                    StepResult::failed(RetirementStep::InventoryDeletion, e),
                ));
                skip_remaining(
                    &mut steps,
                    &mac_addresses,
                    self.asset.is_some(),
                    "inventory deletion failed",
                );
                return RetirementOutcome::new(computer_id, serial_number, steps);
            }
        }

        // Steps 3 and 4: advisory, concurrent
        let (asset_report, nac_reports) = tokio::join!(
            self.sync_asset_state(serial_number, deadline),
            self.cleanup_nac(&mac_addresses, deadline)
        );
        steps.push(asset_report);
        steps.extend(nac_reports);

        let outcome = RetirementOutcome::new(computer_id, serial_number, steps);
        info!(status = ?outcome.status, "Retirement of computer {} finished", computer_id);
        outcome
    }

    async fn sync_asset_state(&self, serial_number: &str, deadline: Instant) -> StepReport {
        let step = RetirementStep::AssetSync;
        let Some(asset) = self.asset.as_ref() else {
            return StepReport::new(step, StepResult::skipped("asset sync disabled"));
        };

        let open = asset.open_session().map_err(StewardError::from);
        let session = match until(deadline, "asset session", open).await {
            Ok(session) => session,
            Err(e) => {
                warn!(step = "assetSync", "Could not open asset session: {}", e);
                return StepReport::new(step, StepResult::failed(step, e));
            }
        };

        let result = until(
            deadline,
            "asset state sync",
            self.flip_asset_state(asset.as_ref(), &session, serial_number),
        )
        .await;

        // The session is released on every path, even past the deadline
        if let Err(e) = asset.kill_session(session).await {
            warn!(step = "assetSync", "Failed to close asset session: {}", e);
        }

        match result {
            Ok(asset_id) => {
                info!(
                    step = "assetSync",
                    "Asset {} for {} marked out of service", asset_id, serial_number
                );
                StepReport::new(step, StepResult::Succeeded)
            }
            Err(e) => {
                warn!(step = "assetSync", "Asset sync failed for {}: {}", serial_number, e);
                StepReport::new(step, StepResult::failed(step, e))
            }
        }
    }

    async fn flip_asset_state(
        &self,
        asset: &dyn AssetGateway,
        session: &AssetSession,
        serial_number: &str,
    ) -> Result<i64> {
        let records = asset.search_by_serial(session, serial_number).await?;
        let record = match records.as_slice() {
            [record] => record,
            [] => {
                return Err(StewardError::not_found(format!(
                    "no asset record matches serial {}",
                    serial_number
                )));
            }
            many => {
                return Err(StewardError::ConflictError(format!(
                    "{} asset records match serial {}",
                    many.len(),
                    serial_number
                )));
            }
        };
        asset
            .update_state(session, record.id, self.retired_state_id)
            .await?;
        Ok(record.id)
    }

    async fn cleanup_nac(&self, mac_addresses: &[String], deadline: Instant) -> Vec<StepReport> {
        let step = RetirementStep::NacCleanup;
        if mac_addresses.is_empty() {
            return vec![StepReport::new(
                step,
                StepResult::skipped("no MAC addresses provided"),
            )];
        }

        join_all(mac_addresses.iter().map(|mac| async move {
            let delete = self.nac.delete_endpoint(mac).map_err(StewardError::from);
            let result = until(deadline, "NAC endpoint deletion", delete).await;
            let report = match result {
                Ok(()) => StepReport::new(step, StepResult::Succeeded),
                Err(e) => {
                    warn!(step = "nacCleanup", "Failed to delete NAC endpoint {}: {}", mac, e);
                    StepReport::new(step, StepResult::failed(step, e))
                }
            };
            report.with_target(mac)
        }))
        .await
    }
}

fn join_error(operation: &str, err: JoinError) -> StewardError {
    error!("{} task did not complete: {}", operation, err);
    StewardError::InternalError(format!("{} task did not complete", operation))
}

/// Record the steps an abort prevented
fn skip_remaining(
    steps: &mut Vec<StepReport>,
    mac_addresses: &[String],
    asset_enabled: bool,
    reason: &str,
) {
    let attempted: Vec<RetirementStep> = steps.iter().map(|s| s.step).collect();
    if !attempted.contains(&RetirementStep::InventoryDeletion) {
        steps.push(StepReport::new(
            RetirementStep::InventoryDeletion,
            StepResult::skipped(reason),
        ));
    }
    if asset_enabled {
        steps.push(StepReport::new(
            RetirementStep::AssetSync,
            StepResult::skipped(reason),
        ));
    }
    if mac_addresses.is_empty() {
        steps.push(StepReport::new(
            RetirementStep::NacCleanup,
            StepResult::skipped(reason),
        ));
    }
    for mac in mac_addresses {
        steps.push(
            StepReport::new(RetirementStep::NacCleanup, StepResult::skipped(reason))
                .with_target(mac),
        );
    }
}
