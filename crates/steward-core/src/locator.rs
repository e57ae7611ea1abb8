//! Resource locators
//!
//! Translate serial fragments, prestage names and ids into canonical
//! upstream identifiers. Nothing is cached: every lookup lists the upstream
//! collection again.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, instrument};

use steward_client::{Building, EnrollmentDevice, PrestageDefinition};
use steward_common::{Result, StewardError};

use crate::model::{DeviceRef, PrestageAssignment, PrestageRef};
use crate::upstream::MdmGateway;

const PRESTAGE_NOT_FOUND: &str = "Prestage not found";

/// Fresh view of a serial's scope together with the prestage listing it was
/// resolved against
#[derive(Clone, Debug)]
pub struct ScopeSnapshot {
    pub assignment: PrestageAssignment,
    pub prestages: Vec<PrestageDefinition>,
}

impl ScopeSnapshot {
    pub fn find(&self, prestage: &PrestageRef) -> Option<&PrestageDefinition> {
        find_prestage(&self.prestages, prestage)
    }
}

/// Find a prestage in a listing by id or exact display name
pub fn find_prestage<'a>(
    prestages: &'a [PrestageDefinition],
    prestage: &PrestageRef,
) -> Option<&'a PrestageDefinition> {
    prestages.iter().find(|p| match prestage {
        PrestageRef::Id(id) => p.id == *id,
        PrestageRef::Name(name) => p.display_name == *name,
    })
}

#[derive(Clone)]
pub struct ResourceLocator {
    mdm: Arc<dyn MdmGateway>,
}

impl ResourceLocator {
    pub fn new(mdm: Arc<dyn MdmGateway>) -> Self {
        Self { mdm }
    }

    /// Partial serial match against inventory; may be empty
    #[instrument(skip(self))]
    pub async fn match_computer(&self, search: &str) -> Result<Vec<DeviceRef>> {
        let matches = self.mdm.match_computers(search).await?;
        Ok(matches.into_iter().map(DeviceRef::from).collect())
    }

    /// Devices known to any enrollment instance whose serial equals `serial_number`
    ///
    /// Instances are scanned concurrently.
    #[instrument(skip(self))]
    pub async fn find_enrollment_devices(
        &self,
        serial_number: &str,
    ) -> Result<Vec<EnrollmentDevice>> {
        let instances = self.mdm.enrollment_instances().await?;
        debug!("Scanning {} enrollment instances", instances.len());

        let per_instance = try_join_all(
            instances
                .iter()
                .map(|instance| self.mdm.enrollment_devices(instance.id)),
        )
        .await?;

        Ok(per_instance
            .into_iter()
            .flatten()
            .filter(|device| device.serial_number == serial_number)
            .collect())
    }

    pub async fn prestages(&self) -> Result<Vec<PrestageDefinition>> {
        Ok(self.mdm.prestages().await?)
    }

    pub async fn buildings(&self) -> Result<Vec<Building>> {
        Ok(self.mdm.buildings().await?)
    }

    pub async fn find_prestage(&self, prestage: &PrestageRef) -> Result<PrestageDefinition> {
        let prestages = self.prestages().await?;
        find_prestage(&prestages, prestage)
            .cloned()
            .ok_or_else(|| StewardError::not_found(PRESTAGE_NOT_FOUND))
    }

    /// Scope map and prestage listing, fetched concurrently and cross-referenced
    #[instrument(skip(self))]
    pub async fn scope_snapshot(&self, serial_number: &str) -> Result<ScopeSnapshot> {
        let (scopes, prestages) =
            futures::try_join!(self.mdm.prestage_scopes(), self.mdm.prestages())?;

        // A scope entry pointing at a prestage missing from the listing reads as unassigned
        let assignment = scopes
            .prestage_for(serial_number)
            .and_then(|id| prestages.iter().find(|p| p.id == id))
            .map(|p| PrestageAssignment::assigned(serial_number, p.clone()))
            .unwrap_or_else(|| PrestageAssignment::unassigned(serial_number));

        debug!(current = %assignment.display_name, "Resolved prestage assignment");
        Ok(ScopeSnapshot {
            assignment,
            prestages,
        })
    }

    /// Current prestage of a serial; `Unassigned` is a normal result
    pub async fn prestage_assignment(&self, serial_number: &str) -> Result<PrestageAssignment> {
        Ok(self.scope_snapshot(serial_number).await?.assignment)
    }
}
