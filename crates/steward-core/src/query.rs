//! Aggregating device query
//!
//! One search term fans out into inventory, scope and preload reads per
//! matched device. Per-device reads degrade instead of failing the query.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use steward_client::{ComputerInventory, EnrollmentDevice, PreloadRecord};
use steward_common::constants::{
    NO_ASSET_TAG_YET, NO_COMPUTERS_FOUND, NO_ENROLLMENT_METHOD, NOT_AVAILABLE,
};
use steward_common::{Result, StewardError, is_placeholder};

use crate::deadline::within;
use crate::locator::ResourceLocator;
use crate::model::{DeviceRecord, DeviceRef};
use crate::upstream::MdmGateway;

#[derive(Clone)]
pub struct DeviceQueryHandler {
    mdm: Arc<dyn MdmGateway>,
    locator: ResourceLocator,
    deadline: Duration,
}

impl DeviceQueryHandler {
    pub fn new(mdm: Arc<dyn MdmGateway>, deadline: Duration) -> Self {
        Self {
            locator: ResourceLocator::new(mdm.clone()),
            mdm,
            deadline,
        }
    }

    /// Everything known about the devices matching `term`
    ///
    /// Falls back to the enrollment instances when inventory has no match, so
    /// devices that were bought but never enrolled still show up. An empty
    /// result is `NotFound`.
    #[instrument(skip(self))]
    pub async fn search_devices(&self, term: &str) -> Result<Vec<DeviceRecord>> {
        if is_placeholder(term) {
            return Err(StewardError::IllegalArgument(
                "search term is required".to_string(),
            ));
        }
        within(self.deadline, "device search", self.search(term.trim())).await
    }

    async fn search(&self, term: &str) -> Result<Vec<DeviceRecord>> {
        let devices = self.locator.match_computer(term).await?;

        let records = if devices.is_empty() {
            debug!("No inventory match, scanning enrollment instances");
            let enrolled = self.locator.find_enrollment_devices(term).await?;
            join_all(enrolled.iter().map(|device| self.enrollment_record(device))).await
        } else {
            join_all(devices.iter().map(|device| self.inventory_record(device))).await
        };

        if records.is_empty() {
            return Err(StewardError::not_found(NO_COMPUTERS_FOUND));
        }
        Ok(records)
    }

    async fn inventory_record(&self, device: &DeviceRef) -> DeviceRecord {
        let serial = device.serial_number.as_str();
        let (inventory, prestage, preload) = tokio::join!(
            self.mdm.computer_inventory(device.computer_id),
            self.current_prestage(serial),
            self.preload(serial)
        );

        let mut record = DeviceRecord {
            computer_id: Some(device.computer_id),
            serial_number: device.serial_number.clone(),
            current_prestage: prestage,
            ..Default::default()
        };

        match inventory {
            Ok(inventory) => apply_inventory(&mut record, inventory),
            Err(e) => {
                warn!(
                    computer_id = device.computer_id,
                    "Inventory read failed, degrading fields: {}", e
                );
                record.name = Some(NOT_AVAILABLE.to_string());
                record.asset_tag = NOT_AVAILABLE.to_string();
                record.enrollment_method = Some(NOT_AVAILABLE.to_string());
            }
        }
        apply_preload(&mut record, preload);
        record
    }

    async fn enrollment_record(&self, device: &EnrollmentDevice) -> DeviceRecord {
        let serial = device.serial_number.as_str();
        let (prestage, preload) = tokio::join!(self.current_prestage(serial), self.preload(serial));

        let mut record = DeviceRecord {
            asset_tag: NO_ASSET_TAG_YET.to_string(),
            serial_number: device.serial_number.clone(),
            current_prestage: prestage,
            ..Default::default()
        };
        apply_preload(&mut record, preload);
        record
    }

    async fn current_prestage(&self, serial_number: &str) -> String {
        match self.locator.prestage_assignment(serial_number).await {
            Ok(assignment) => assignment.display_name,
            Err(e) => {
                warn!(serial_number, "Prestage assignment read failed: {}", e);
                NOT_AVAILABLE.to_string()
            }
        }
    }

    async fn preload(&self, serial_number: &str) -> Option<PreloadRecord> {
        match self.mdm.preload_record(serial_number).await {
            Ok(record) => record,
            Err(e) => {
                warn!(serial_number, "Preload read failed: {}", e);
                None
            }
        }
    }
}

fn apply_inventory(record: &mut DeviceRecord, inventory: ComputerInventory) {
    let general = inventory.general.unwrap_or_default();
    record.name = Some(non_empty(general.name).unwrap_or_else(|| NOT_AVAILABLE.to_string()));
    record.asset_tag = non_empty(general.asset_tag).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    record.enrollment_method = Some(
        non_empty(general.enrollment_method.and_then(|m| m.object_name))
            .unwrap_or_else(|| NO_ENROLLMENT_METHOD.to_string()),
    );

    if let Some(hardware) = inventory.hardware {
        record.mac_address = non_empty(hardware.mac_address);
        record.alt_mac_address = non_empty(hardware.alt_mac_address);
    }
}

fn apply_preload(record: &mut DeviceRecord, preload: Option<PreloadRecord>) {
    if let Some(preload) = preload {
        record.preload_id = Some(preload.id);
        record.username = preload.username;
        record.email = preload.email_address;
        record.building = preload.building;
        record.room = preload.room;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MdmOp, MockMdm};
    use serde_json::json;
    use steward_client::{EnrollmentMethod, InventoryGeneral, InventoryHardware};
    use steward_common::constants::UNASSIGNED;

    fn handler(mdm: &Arc<MockMdm>) -> DeviceQueryHandler {
        DeviceQueryHandler::new(mdm.clone(), Duration::from_secs(10))
    }

    fn inventory(id: i64, name: &str, asset_tag: &str) -> ComputerInventory {
        ComputerInventory {
            id,
            general: Some(InventoryGeneral {
                name: Some(name.to_string()),
                asset_tag: Some(asset_tag.to_string()),
                enrollment_method: Some(EnrollmentMethod {
                    object_name: Some("Automated Device Enrollment".to_string()),
                    object_type: None,
                }),
            }),
            hardware: Some(InventoryHardware {
                serial_number: None,
                mac_address: Some("aa:bb:cc:dd:ee:01".to_string()),
                alt_mac_address: Some(String::new()),
            }),
        }
    }

    fn preload(id: i64, serial_number: &str) -> PreloadRecord {
        PreloadRecord {
            id,
            serial_number: Some(serial_number.to_string()),
            username: Some("jdoe".to_string()),
            email_address: Some("jdoe@example.edu".to_string()),
            building: Some("Science".to_string()),
            room: Some("204".to_string()),
            asset_tag: None,
        }
    }

    #[tokio::test]
    async fn test_merges_three_reads() {
        let mdm = Arc::new(MockMdm::new());
        mdm.add_computer(42, "ABC123", "lab-01").await;
        mdm.set_inventory(inventory(42, "lab-01", "T-1001")).await;
        mdm.add_prestage(7, "Staff", None).await;
        mdm.set_scope("ABC123", 7).await;
        mdm.add_preload(preload(9, "ABC123")).await;

        let records = handler(&mdm).search_devices("ABC").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            serde_json::to_value(&records[0]).unwrap(),
            json!({
                "computerId": 42,
                "name": "lab-01",
                "assetTag": "T-1001",
                "enrollmentMethod": "Automated Device Enrollment",
                "serialNumber": "ABC123",
                "currentPrestage": "Staff",
                "macAddress": "aa:bb:cc:dd:ee:01",
                "altMacAddress": null,
                "preloadId": 9,
                "username": "jdoe",
                "email": "jdoe@example.edu",
                "building": "Science",
                "room": "204"
            })
        );
    }

    #[tokio::test]
    async fn test_one_row_per_match() {
        let mdm = Arc::new(MockMdm::new());
        mdm.add_computer(1, "ABC123", "a").await;
        mdm.add_computer(2, "ABC124", "b").await;

        let records = handler(&mdm).search_devices("ABC12").await.unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.current_prestage == UNASSIGNED));
        assert_eq!(mdm.count(MdmOp::ComputerInventory).await, 2);
    }

    #[tokio::test]
    async fn test_failed_inventory_read_degrades() {
        let mdm = Arc::new(MockMdm::new());
        mdm.add_computer(42, "ABC123", "lab-01").await;
        mdm.fail(MdmOp::ComputerInventory, 500, "inventory down").await;
        mdm.fail(MdmOp::PrestageScopes, 503, "maintenance").await;

        let records = handler(&mdm).search_devices("ABC123").await.unwrap();

        let record = &records[0];
        assert_eq!(record.name.as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(record.asset_tag, NOT_AVAILABLE);
        assert_eq!(record.current_prestage, NOT_AVAILABLE);
        assert_eq!(record.preload_id, None);
    }

    #[tokio::test]
    async fn test_missing_general_fields_use_placeholders() {
        let mdm = Arc::new(MockMdm::new());
        mdm.add_computer(42, "ABC123", "lab-01").await;
        mdm.set_inventory(ComputerInventory {
            id: 42,
            general: None,
            hardware: None,
        })
        .await;

        let records = handler(&mdm).search_devices("ABC123").await.unwrap();

        assert_eq!(records[0].name.as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(
            records[0].enrollment_method.as_deref(),
            Some(NO_ENROLLMENT_METHOD)
        );
    }

    #[tokio::test]
    async fn test_enrollment_fallback() {
        let mdm = Arc::new(MockMdm::new());
        mdm.add_enrollment_device(1, "NEW001").await;
        mdm.add_enrollment_device(1, "NEW0011").await;
        mdm.add_preload(preload(5, "NEW001")).await;

        let records = handler(&mdm).search_devices("NEW001").await.unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.computer_id, None);
        assert_eq!(record.asset_tag, NO_ASSET_TAG_YET);
        assert_eq!(record.current_prestage, UNASSIGNED);
        assert_eq!(record.preload_id, Some(5));
        assert_eq!(record.username.as_deref(), Some("jdoe"));
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let mdm = Arc::new(MockMdm::new());

        let err = handler(&mdm).search_devices("NOPE").await.unwrap_err();

        assert_eq!(err, StewardError::not_found(NO_COMPUTERS_FOUND));
    }

    #[tokio::test]
    async fn test_match_failure_propagates() {
        let mdm = Arc::new(MockMdm::new());
        mdm.fail(MdmOp::MatchComputers, 401, "token expired").await;

        let err = handler(&mdm).search_devices("ABC").await.unwrap_err();

        assert_eq!(err.http_status(), 401);
    }

    #[tokio::test]
    async fn test_placeholder_term_rejected() {
        let mdm = Arc::new(MockMdm::new());

        let err = handler(&mdm).search_devices("undefined").await.unwrap_err();

        assert!(matches!(err, StewardError::IllegalArgument(_)));
        assert!(mdm.calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fan_out_hits_deadline() {
        let mdm = Arc::new(MockMdm::new());
        mdm.add_computer(42, "ABC123", "lab-01").await;
        mdm.delay(MdmOp::PreloadRecord, Duration::from_secs(30)).await;

        let err = handler(&mdm).search_devices("ABC123").await.unwrap_err();

        assert_eq!(err.http_status(), 504);
    }
}
