//! Wire models for upstream payloads
//!
//! The MDM is inconsistent about id encoding: the same id can arrive as
//! `7` or `"7"` depending on the endpoint version. Ids are normalized to
//! `i64` on the way in.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use steward_common::is_placeholder;

use crate::constants::PRELOAD_DEVICE_TYPE;

/// Paged collection envelope used by the MDM's v1+ APIs
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub total_count: Option<i64>,
    #[serde(default)]
    pub results: Vec<T>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ComputerMatchResponse {
    #[serde(default)]
    pub computers: Vec<ComputerMatch>,
}

/// One hit of a partial serial/name match against inventory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputerMatch {
    pub id: i64,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Automated device enrollment instance
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentInstance {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A device known to an enrollment instance but possibly not yet enrolled
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDevice {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Inventory detail restricted to the GENERAL and HARDWARE sections
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventory {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub general: Option<InventoryGeneral>,
    #[serde(default)]
    pub hardware: Option<InventoryHardware>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryGeneral {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub asset_tag: Option<String>,
    #[serde(default)]
    pub enrollment_method: Option<EnrollmentMethod>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentMethod {
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryHardware {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub alt_mac_address: Option<String>,
}

/// PATCH body for the inventory detail of one computer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub general: InventoryGeneralUpdate,
    pub user_and_location: UserAndLocation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryGeneralUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAndLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Optimistic-concurrency token of a prestage
///
/// The upstream sends an integer; older payloads and the listing fallback
/// carry it as text, including the `"N/A"` sentinel for "no lock".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionLock {
    Number(i64),
    Text(String),
}

impl VersionLock {
    /// Whether this is a real lock value rather than a placeholder
    pub fn is_usable(&self) -> bool {
        match self {
            VersionLock::Number(_) => true,
            VersionLock::Text(text) => !is_placeholder(text),
        }
    }
}

impl fmt::Display for VersionLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionLock::Number(n) => write!(f, "{}", n),
            VersionLock::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for VersionLock {
    fn from(value: i64) -> Self {
        VersionLock::Number(value)
    }
}

impl From<&str> for VersionLock {
    fn from(value: &str) -> Self {
        VersionLock::Text(value.to_string())
    }
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrestageDefinition {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub version_lock: Option<VersionLock>,
}

impl PrestageDefinition {
    pub fn new(id: i64, display_name: &str, version_lock: Option<VersionLock>) -> Self {
        Self {
            id,
            display_name: display_name.to_string(),
            version_lock,
        }
    }

    /// The lock to send with a scope mutation, `None` when absent or a sentinel
    pub fn usable_version_lock(&self) -> Option<&VersionLock> {
        self.version_lock.as_ref().filter(|lock| lock.is_usable())
    }
}

/// Bulk serial to prestage map
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeAssignments {
    #[serde_as(as = "HashMap<_, PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub serials_by_prestage_id: HashMap<String, i64>,
}

impl ScopeAssignments {
    pub fn prestage_for(&self, serial_number: &str) -> Option<i64> {
        self.serials_by_prestage_id.get(serial_number).copied()
    }
}

/// Body of a scope add or remove
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeMutation {
    pub serial_numbers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_lock: Option<VersionLock>,
}

impl ScopeMutation {
    /// Mutation for one serial, carrying the prestage's lock only when usable
    pub fn for_serial(serial_number: &str, prestage: &PrestageDefinition) -> Self {
        Self {
            serial_numbers: vec![serial_number.to_string()],
            version_lock: prestage.usable_version_lock().cloned(),
        }
    }
}

/// Pre-enrollment metadata as read from the MDM
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadRecord {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub asset_tag: Option<String>,
}

/// Create/replace body for a preload record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadPayload {
    pub device_type: String,
    pub serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
}

impl PreloadPayload {
    pub fn computer(serial_number: &str) -> Self {
        Self {
            device_type: PRELOAD_DEVICE_TYPE.to_string(),
            serial_number: serial_number.to_string(),
            username: None,
            email_address: None,
            building: None,
            room: None,
            asset_tag: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasePayload {
    pub pin: String,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Building {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AssetSessionResponse {
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Raw search result; rows are keyed by search option id
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AssetSearchResponse {
    #[serde(default)]
    pub totalcount: i64,
    #[serde(default)]
    pub data: Vec<HashMap<String, serde_json::Value>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    pub id: i64,
    pub serial_number: Option<String>,
}

impl AssetSearchResponse {
    /// Decode rows into records, skipping rows without a usable id
    pub fn records(&self, id_field: u32, serial_field: u32) -> Vec<AssetRecord> {
        let id_key = id_field.to_string();
        let serial_key = serial_field.to_string();
        self.data
            .iter()
            .filter_map(|row| {
                let id = match row.get(&id_key)? {
                    serde_json::Value::Number(n) => n.as_i64()?,
                    serde_json::Value::String(s) => s.trim().parse().ok()?,
                    _ => return None,
                };
                let serial_number = row
                    .get(&serial_key)
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                Some(AssetRecord { id, serial_number })
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStateUpdate {
    pub input: AssetStateInput,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStateInput {
    pub states_id: i64,
}

impl AssetStateUpdate {
    pub fn new(states_id: i64) -> Self {
        Self {
            input: AssetStateInput { states_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prestage_id_accepts_string_and_number() {
        let numeric: PrestageDefinition =
            serde_json::from_value(json!({"id": 7, "displayName": "Staff", "versionLock": 3}))
                .unwrap();
        let textual: PrestageDefinition =
            serde_json::from_value(json!({"id": "7", "displayName": "Staff"})).unwrap();

        assert_eq!(numeric.id, 7);
        assert_eq!(textual.id, 7);
        assert_eq!(numeric.version_lock, Some(VersionLock::Number(3)));
        assert_eq!(textual.version_lock, None);
    }

    #[test]
    fn test_sentinel_version_lock_is_not_usable() {
        let prestage = PrestageDefinition::new(3, "Lab", Some("N/A".into()));
        assert!(prestage.usable_version_lock().is_none());

        let prestage = PrestageDefinition::new(3, "Lab", Some("v1".into()));
        assert_eq!(prestage.usable_version_lock(), Some(&VersionLock::from("v1")));
    }

    #[test]
    fn test_scope_mutation_body() {
        let prestage = PrestageDefinition::new(7, "Staff", Some("v1".into()));
        let body = serde_json::to_value(ScopeMutation::for_serial("ABC123", &prestage)).unwrap();
        assert_eq!(body, json!({"serialNumbers": ["ABC123"], "versionLock": "v1"}));

        let unlocked = PrestageDefinition::new(7, "Staff", None);
        let body = serde_json::to_value(ScopeMutation::for_serial("ABC123", &unlocked)).unwrap();
        assert_eq!(body, json!({"serialNumbers": ["ABC123"]}));
    }

    #[test]
    fn test_scope_assignments_mixed_values() {
        let scopes: ScopeAssignments = serde_json::from_value(json!({
            "serialsByPrestageId": {"ABC123": "7", "XYZ999": 3},
            "versionLock": 12
        }))
        .unwrap();

        assert_eq!(scopes.prestage_for("ABC123"), Some(7));
        assert_eq!(scopes.prestage_for("XYZ999"), Some(3));
        assert_eq!(scopes.prestage_for("NOPE"), None);
    }

    #[test]
    fn test_inventory_sections() {
        let inventory: ComputerInventory = serde_json::from_value(json!({
            "id": "42",
            "general": {
                "name": "lab-mac-01",
                "assetTag": "A-100",
                "enrollmentMethod": {
                    "id": "5",
                    "objectName": "Staff",
                    "objectType": "Automated Device Enrollment"
                }
            },
            "hardware": {"macAddress": "AA:BB:CC:DD:EE:FF", "altMacAddress": null}
        }))
        .unwrap();

        assert_eq!(inventory.id, 42);
        let general = inventory.general.unwrap();
        assert_eq!(general.asset_tag.as_deref(), Some("A-100"));
        assert_eq!(
            general.enrollment_method.unwrap().object_name.as_deref(),
            Some("Staff")
        );
        assert_eq!(inventory.hardware.unwrap().alt_mac_address, None);
    }

    #[test]
    fn test_preload_payload_omits_missing_fields() {
        let mut payload = PreloadPayload::computer("ABC123");
        payload.username = Some("jdoe".to_string());

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            body,
            json!({"deviceType": "Computer", "serialNumber": "ABC123", "username": "jdoe"})
        );
    }

    #[test]
    fn test_building_keeps_extra_fields() {
        let building: Building = serde_json::from_value(json!({
            "id": "1", "name": "HQ", "city": "Springfield"
        }))
        .unwrap();

        assert_eq!(building.id, 1);
        assert_eq!(building.name, "HQ");
        assert_eq!(building.details.get("city"), Some(&json!("Springfield")));
    }

    #[test]
    fn test_asset_search_records() {
        let response: AssetSearchResponse = serde_json::from_value(json!({
            "totalcount": 2,
            "data": [
                {"2": 15, "5": "ABC123"},
                {"2": "16", "5": "ABC123"},
                {"5": "ORPHAN"}
            ]
        }))
        .unwrap();

        let records = response.records(2, 5);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 15);
        assert_eq!(records[1].id, 16);
        assert_eq!(records[1].serial_number.as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_asset_state_update_body() {
        let body = serde_json::to_value(AssetStateUpdate::new(4)).unwrap();
        assert_eq!(body, json!({"input": {"states_id": 4}}));
    }
}
