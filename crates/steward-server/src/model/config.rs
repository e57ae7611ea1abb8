//! Configuration management for Steward server
//!
//! Settings are layered: `conf/application.yml`, then `STEWARD_`-prefixed
//! environment variables (`__` separates nesting levels, so
//! `STEWARD_MDM__CLIENT_SECRET` sets `mdm.client_secret`), then command line
//! flags. Upstream client configs are built once here and never re-read.

use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use config::{Config, Environment, File};

use steward_client::{AssetClientConfig, MdmClientConfig, NacClientConfig};
use steward_core::OrchestrationConfig;
use steward_core::config::DEFAULT_OPERATION_TIMEOUT_MS;

use crate::startup::LoggingConfig;

use super::constants::*;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(name = "steward-server", about = "Device lifecycle orchestration server")]
struct Cli {
    /// Path of the YAML configuration file
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    config: String,
    /// Listen port, overrides `server.port`
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
}

/// `STEWARD_*` variables, kept as strings
///
/// Secrets and PINs may be all digits with leading zeros; typed getters
/// convert numeric and boolean keys on read.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Load configuration using the process command line
    pub fn new() -> anyhow::Result<Self> {
        let args = Cli::parse();
        Self::load(&args.config, args.port)
    }

    /// Load configuration from `path` plus the environment
    ///
    /// A missing file is tolerated so a deployment can be configured through
    /// the environment alone.
    pub fn load(path: &str, port: Option<u16>) -> anyhow::Result<Self> {
        Self::load_with(path, port, environment())
    }

    fn load_with(path: &str, port: Option<u16>, environment: Environment) -> anyhow::Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment);

        if let Some(port) = port {
            builder = builder.set_override(SERVER_PORT, i64::from(port))?;
        }

        let config = builder
            .build()
            .with_context(|| format!("failed to build configuration from {}", path))?;

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    fn required(&self, key: &str) -> anyhow::Result<String> {
        self.config
            .get_string(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("missing mandatory setting '{}'", key))
    }

    fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.config
            .get_int(key)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(default)
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS)
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT)
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Origin allowed by CORS, e.g. `https://steward.example.edu`
    pub fn cors_origin(&self) -> String {
        let hostname = self
            .config
            .get_string(SERVER_CLIENT_HOSTNAME)
            .unwrap_or(DEFAULT_CLIENT_HOSTNAME.to_string());
        format!("https://{}", hostname)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(
            self.u64_or(SERVER_SHUTDOWN_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        )
    }

    // ========================================================================
    // Orchestration Configuration
    // ========================================================================

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.u64_or(OPERATION_TIMEOUT_MS, DEFAULT_OPERATION_TIMEOUT_MS))
    }

    pub fn asset_enabled(&self) -> bool {
        self.config.get_bool(ASSET_ENABLED).unwrap_or(true)
    }

    pub fn orchestration_config(&self) -> anyhow::Result<OrchestrationConfig> {
        let mut config =
            OrchestrationConfig::default().with_operation_timeout(self.operation_timeout());
        if self.asset_enabled() {
            let state_id = self
                .config
                .get_int(ASSET_RETIRED_STATE_ID)
                .map_err(|_| {
                    anyhow!("missing mandatory setting '{}'", ASSET_RETIRED_STATE_ID)
                })?;
            config = config.with_retired_state_id(state_id);
        }
        Ok(config)
    }

    // ========================================================================
    // Upstream Configuration
    // ========================================================================

    pub fn mdm_client_config(&self) -> anyhow::Result<MdmClientConfig> {
        let mut config = MdmClientConfig::new(&self.required(MDM_BASE_URL)?)
            .with_credentials(
                &self.required(MDM_CLIENT_ID)?,
                &self.required(MDM_CLIENT_SECRET)?,
            )
            .with_timeouts(
                self.u64_or(MDM_CONNECT_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS),
                self.u64_or(MDM_READ_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS),
            );
        if let Ok(pin) = self.config.get_string(MDM_ERASE_PIN) {
            config = config.with_erase_pin(&pin);
        }
        Ok(config)
    }

    /// `None` when asset-state sync is switched off
    pub fn asset_client_config(&self) -> anyhow::Result<Option<AssetClientConfig>> {
        if !self.asset_enabled() {
            return Ok(None);
        }
        let config = AssetClientConfig::new(&self.required(ASSET_BASE_URL)?)
            .with_tokens(
                &self.required(ASSET_APP_TOKEN)?,
                &self.required(ASSET_USER_TOKEN)?,
            )
            .with_timeouts(
                self.u64_or(ASSET_CONNECT_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS),
                self.u64_or(ASSET_READ_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS),
            );
        Ok(Some(config))
    }

    pub fn nac_client_config(&self) -> anyhow::Result<NacClientConfig> {
        Ok(NacClientConfig::new(&self.required(NAC_BASE_URL)?)
            .with_credentials(
                &self.required(NAC_CLIENT_ID)?,
                &self.required(NAC_CLIENT_SECRET)?,
            )
            .with_timeouts(
                self.u64_or(NAC_CONNECT_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS),
                self.u64_or(NAC_READ_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS),
            ))
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string(LOGGING_DIR).ok(),
            self.config.get_bool(LOGGING_CONSOLE).unwrap_or(true),
            self.config.get_bool(LOGGING_FILE).unwrap_or(true),
            self.config
                .get_string(LOGGING_LEVEL)
                .unwrap_or("info".to_string()),
        )
    }
}
