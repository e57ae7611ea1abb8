//! Prestage reassignment
//!
//! The MDM's scope add is additive, so a device moved between prestages
//! would end up in both unless its previous scope is removed first. Every
//! reassignment re-reads the scope map and prestage listing, and the
//! remove/add pair for one serial runs under a per-serial lock.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use steward_client::{ClientError, PrestageDefinition, ScopeMutation};
use steward_common::constants::REMOVE_BEFORE_ADD;
use steward_common::{Result, StewardError};

use crate::deadline::within;
use crate::locator::ResourceLocator;
use crate::lock::ScopeLocks;
use crate::model::{PrestageRef, PriorScope, ScopeMutationResult, ScopeRemovalResult};
use crate::upstream::MdmGateway;

#[derive(Clone)]
pub struct PrestageOrchestrator {
    mdm: Arc<dyn MdmGateway>,
    locator: ResourceLocator,
    locks: ScopeLocks,
    deadline: Duration,
}

impl PrestageOrchestrator {
    pub fn new(mdm: Arc<dyn MdmGateway>, locks: ScopeLocks, deadline: Duration) -> Self {
        Self {
            locator: ResourceLocator::new(mdm.clone()),
            mdm,
            locks,
            deadline,
        }
    }

    /// Scope `serial_number` to exactly the target prestage
    ///
    /// Fails with `NotFound` before any mutation when the target is unknown.
    /// A failed removal of the previous scope is recorded in the result and
    /// the add still goes ahead.
    #[instrument(skip(self))]
    pub async fn reassign(
        &self,
        serial_number: &str,
        target_prestage_id: i64,
    ) -> Result<ScopeMutationResult> {
        require_serial(serial_number)?;
        within(
            self.deadline,
            "prestage reassignment",
            self.reassign_locked(serial_number, target_prestage_id),
        )
        .await
    }

    async fn reassign_locked(
        &self,
        serial_number: &str,
        target_prestage_id: i64,
    ) -> Result<ScopeMutationResult> {
        let _guard = self.locks.acquire(serial_number).await;

        let snapshot = self.locator.scope_snapshot(serial_number).await?;
        let target = snapshot
            .find(&PrestageRef::Id(target_prestage_id))
            .cloned()
            .ok_or_else(|| StewardError::not_found("Prestage not found"))?;

        let prior_scope = match snapshot.assignment.prestage {
            None => PriorScope::Unassigned,
            Some(ref current) if current.id == target.id => PriorScope::Target,
            Some(ref current) => self.remove_prior_scope(serial_number, current).await,
        };

        let mutation = ScopeMutation::for_serial(serial_number, &target);
        let response = self
            .mdm
            .add_to_prestage_scope(target.id, &mutation)
            .await
            .map_err(scope_add_error)?;

        info!(
            prestage_id = target.id,
            "Scoped {} to prestage '{}'", serial_number, target.display_name
        );
        Ok(ScopeMutationResult {
            serial_number: serial_number.to_string(),
            prestage_id: target.id,
            display_name: target.display_name,
            prior_scope,
            response,
        })
    }

    /// Best-effort removal of the current scope
    async fn remove_prior_scope(
        &self,
        serial_number: &str,
        current: &PrestageDefinition,
    ) -> PriorScope {
        let mutation = ScopeMutation::for_serial(serial_number, current);
        match self
            .mdm
            .remove_from_prestage_scope(current.id, &mutation)
            .await
        {
            Ok(_) => {
                info!(
                    prestage_id = current.id,
                    "Removed {} from prestage '{}'", serial_number, current.display_name
                );
                PriorScope::Removed {
                    prestage_id: current.id,
                    display_name: current.display_name.clone(),
                }
            }
            Err(e) => {
                warn!(
                    prestage_id = current.id,
                    "Failed to remove {} from prestage '{}': {}",
                    serial_number,
                    current.display_name,
                    e
                );
                PriorScope::RemoveFailed {
                    prestage_id: current.id,
                    display_name: current.display_name.clone(),
                    error: e.upstream_message(),
                }
            }
        }
    }

    /// Remove `serial_number` from one prestage, resolved by id or display name
    #[instrument(skip(self))]
    pub async fn remove_from_prestage(
        &self,
        serial_number: &str,
        prestage: PrestageRef,
    ) -> Result<ScopeRemovalResult> {
        require_serial(serial_number)?;
        within(
            self.deadline,
            "prestage removal",
            self.remove_locked(serial_number, &prestage),
        )
        .await
    }

    async fn remove_locked(
        &self,
        serial_number: &str,
        prestage: &PrestageRef,
    ) -> Result<ScopeRemovalResult> {
        let _guard = self.locks.acquire(serial_number).await;

        let prestage = self.locator.find_prestage(prestage).await?;
        let mutation = ScopeMutation::for_serial(serial_number, &prestage);
        let response = self
            .mdm
            .remove_from_prestage_scope(prestage.id, &mutation)
            .await?;

        info!(
            prestage_id = prestage.id,
            "Removed {} from prestage '{}'", serial_number, prestage.display_name
        );
        Ok(ScopeRemovalResult {
            serial_number: serial_number.to_string(),
            prestage_id: prestage.id,
            display_name: prestage.display_name,
            response,
        })
    }
}

fn require_serial(serial_number: &str) -> Result<()> {
    if steward_common::is_placeholder(serial_number) {
        return Err(StewardError::IllegalArgument(
            "serial number is required".to_string(),
        ));
    }
    Ok(())
}

/// A 400 on scope add means the serial is held elsewhere or the lock is stale
fn scope_add_error(err: ClientError) -> StewardError {
    if err.status() == Some(400) {
        let message = match &err {
            ClientError::Status { body, .. } if !body.trim().is_empty() => body.clone(),
            _ => REMOVE_BEFORE_ADD.to_string(),
        };
        return StewardError::ConflictError(message);
    }
    err.into()
}
