//! Upstream endpoint paths and protocol constants

pub mod mdm_api_path {
    pub const TOKEN: &str = "/api/oauth/token";
    pub const COMPUTER_MATCH: &str = "/JSSResource/computers/match";
    pub const DEVICE_ENROLLMENTS: &str = "/api/v1/device-enrollments";
    pub const COMPUTERS_INVENTORY: &str = "/api/v1/computers-inventory";
    pub const COMPUTERS_INVENTORY_DETAIL: &str = "/api/v1/computers-inventory-detail";
    pub const COMPUTER_INVENTORY: &str = "/api/v1/computer-inventory";
    pub const PRESTAGES: &str = "/api/v3/computer-prestages";
    pub const PRESTAGE_SCOPES: &str = "/api/v2/computer-prestages/scope";
    pub const PRESTAGES_V2: &str = "/api/v2/computer-prestages";
    pub const PRELOAD_RECORDS: &str = "/api/v2/inventory-preload/records";
    pub const BUILDINGS: &str = "/api/v1/buildings";

    pub const SCOPE: &str = "scope";
    pub const DELETE_MULTIPLE: &str = "delete-multiple";
    pub const DEVICES: &str = "devices";
    pub const ERASE: &str = "erase";
}

pub mod asset_api_path {
    pub const INIT_SESSION: &str = "/initSession/";
    pub const KILL_SESSION: &str = "/killSession/";
    pub const SEARCH_COMPUTER: &str = "/search/Computer";
    pub const COMPUTER: &str = "/Computer";
}

pub mod nac_api_path {
    pub const TOKEN: &str = "/oauth";
    pub const ENDPOINT_BY_MAC: &str = "/endpoint/mac-address";
}

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_ERASE_PIN: &str = "123456";

pub const PRESTAGE_SORT: &str = "id:desc";
pub const BUILDING_SORT: &str = "id:asc";

/// Preload record device type for computers
pub const PRELOAD_DEVICE_TYPE: &str = "Computer";

pub const APP_TOKEN_HEADER: &str = "App-Token";
pub const SESSION_TOKEN_HEADER: &str = "Session-Token";
pub const USER_TOKEN_SCHEME: &str = "user_token";

/// Asset-system search option ids on the Computer itemtype
pub const ASSET_FIELD_ID: u32 = 2;
pub const ASSET_FIELD_SERIAL: u32 = 5;
