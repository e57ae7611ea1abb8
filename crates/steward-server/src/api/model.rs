//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use steward_client::PrestageDefinition;
use steward_common::constants::NOT_AVAILABLE;
use steward_common::{Result, StewardError, is_placeholder};
use steward_core::DeviceUpdate;

/// Body of `POST /api/add-to-prestage`
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToPrestageRequest {
    pub serial_number: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub prestage_id: i64,
}

/// Body of `POST /api/remove-from-prestage`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromPrestageRequest {
    pub serial_number: String,
    /// Display name of the prestage the device is scoped to
    pub current_prestage: String,
}

/// Body of `PUT /api/update-preload/{preloadId}/{computerId}`
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreloadRequest {
    pub serial_number: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub building_id: Option<i64>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub asset_tag: Option<String>,
}

impl From<UpdatePreloadRequest> for DeviceUpdate {
    fn from(value: UpdatePreloadRequest) -> Self {
        DeviceUpdate {
            serial_number: value.serial_number,
            username: value.username,
            email_address: value.email_address,
            building: value.building,
            building_id: value.building_id,
            room: value.room,
            asset_tag: value.asset_tag,
        }
    }
}

/// Prestage as listed to the UI; an absent lock reads `N/A`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrestageView {
    pub id: i64,
    pub display_name: String,
    pub version_lock: String,
}

impl From<PrestageDefinition> for PrestageView {
    fn from(value: PrestageDefinition) -> Self {
        let version_lock = value
            .usable_version_lock()
            .map(|lock| lock.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        PrestageView {
            id: value.id,
            display_name: value.display_name,
            version_lock,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Numeric id from a path segment
pub fn parse_id(value: &str, name: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            StewardError::IllegalArgument(format!("{} must be a number, got '{}'", name, value))
        })
}

/// Numeric id from a path segment where the UI may send a placeholder
pub fn parse_optional_id(value: &str, name: &str) -> Result<Option<i64>> {
    if is_placeholder(value) {
        return Ok(None);
    }
    parse_id(value, name).map(Some)
}
