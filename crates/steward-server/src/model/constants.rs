//! Configuration keys and server defaults

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const ENV_PREFIX: &str = "STEWARD";

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3001;
pub const DEFAULT_CLIENT_HOSTNAME: &str = "localhost:5173";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

// Server
pub const SERVER_ADDRESS: &str = "server.address";
pub const SERVER_PORT: &str = "server.port";
pub const SERVER_CLIENT_HOSTNAME: &str = "server.client_hostname";
pub const SERVER_SHUTDOWN_TIMEOUT_SECS: &str = "server.shutdown_timeout_secs";

// Orchestration
pub const OPERATION_TIMEOUT_MS: &str = "steward.operation_timeout_ms";

// MDM
pub const MDM_BASE_URL: &str = "mdm.base_url";
pub const MDM_CLIENT_ID: &str = "mdm.client_id";
pub const MDM_CLIENT_SECRET: &str = "mdm.client_secret";
pub const MDM_ERASE_PIN: &str = "mdm.erase_pin";
pub const MDM_CONNECT_TIMEOUT_MS: &str = "mdm.connect_timeout_ms";
pub const MDM_READ_TIMEOUT_MS: &str = "mdm.read_timeout_ms";

// Asset system
pub const ASSET_ENABLED: &str = "asset.enabled";
pub const ASSET_BASE_URL: &str = "asset.base_url";
pub const ASSET_APP_TOKEN: &str = "asset.app_token";
pub const ASSET_USER_TOKEN: &str = "asset.user_token";
pub const ASSET_RETIRED_STATE_ID: &str = "asset.retired_state_id";
pub const ASSET_CONNECT_TIMEOUT_MS: &str = "asset.connect_timeout_ms";
pub const ASSET_READ_TIMEOUT_MS: &str = "asset.read_timeout_ms";

// NAC
pub const NAC_BASE_URL: &str = "nac.base_url";
pub const NAC_CLIENT_ID: &str = "nac.client_id";
pub const NAC_CLIENT_SECRET: &str = "nac.client_secret";
pub const NAC_CONNECT_TIMEOUT_MS: &str = "nac.connect_timeout_ms";
pub const NAC_READ_TIMEOUT_MS: &str = "nac.read_timeout_ms";

// Logging
pub const LOGGING_DIR: &str = "logging.dir";
pub const LOGGING_CONSOLE: &str = "logging.console";
pub const LOGGING_FILE: &str = "logging.file";
pub const LOGGING_LEVEL: &str = "logging.level";
