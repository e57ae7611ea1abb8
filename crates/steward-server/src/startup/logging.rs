//! File-based logging module.
//!
//! Different components write to separate log files with daily rotation:
//!
//! | Log File            | Component                          | Target Prefixes                    |
//! |---------------------|------------------------------------|------------------------------------|
//! | steward.log         | Root logger (all components)       | (all)                              |
//! | orchestration.log   | Locators, orchestrators, query     | steward_core                       |
//! | upstream.log        | MDM, asset and NAC clients         | steward_client                     |
//! | http.log            | API handlers and request log       | steward_server::api, actix_web     |
//!
//! Log files are stored in `~/steward/logs` by default.
//! Override with `logging.dir` in the configuration.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_log::LogTracer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Internal definition for a component log file.
struct ComponentLogDef {
    file_name: &'static str,
    /// Target module prefixes routed to this file
    targets: &'static [&'static str],
}

const ROOT_LOG_FILE: &str = "steward.log";

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "orchestration.log",
        targets: &["steward_core"],
    },
    ComponentLogDef {
        file_name: "upstream.log",
        targets: &["steward_client"],
    },
    ComponentLogDef {
        file_name: "http.log",
        targets: &["steward_server::api", "steward_server::model::response", "actix_web"],
    },
];

/// Log rotation policy
#[derive(Debug, Clone, Copy)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration for the entire application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log directory (default: `~/steward/logs`)
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub console_level: Level,
    pub file_logging: bool,
    pub file_level: Level,
    pub rotation: LogRotation,
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{}/steward/logs", home))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_output: true,
            console_level: Level::INFO,
            file_logging: true,
            file_level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Create from application configuration.
    pub fn from_config(
        log_dir: Option<String>,
        console_output: bool,
        file_logging: bool,
        level: String,
    ) -> Self {
        let log_dir = log_dir.map(PathBuf::from).unwrap_or_else(default_log_dir);
        let level = level.parse().unwrap_or(Level::INFO);

        Self {
            log_dir,
            console_output,
            console_level: level,
            file_logging,
            file_level: level,
            rotation: LogRotation::Daily,
        }
    }
}

/// Keeps the non-blocking file writers alive; buffered output is flushed on drop.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

fn file_layer(
    config: &LoggingConfig,
    file_name: &str,
    guards: &mut Vec<WorkerGuard>,
) -> impl Layer<Registry> + Send + Sync {
    let appender = RollingFileAppender::new(config.rotation.into(), &config.log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);

    fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
}

/// Initialize the logging system with multi-file output.
///
/// `RUST_LOG` controls the level of the console and root file layers.
/// Component files use per-layer [`Targets`] filters and capture everything
/// from their targets. `log` records (actix's request logger) are bridged
/// into `tracing` first.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    LogTracer::init()?;

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_string()));
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_filter(filter);
        layers.push(Box::new(console_layer));
    }

    if config.file_logging {
        let root_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.file_level.to_string()));
        layers.push(Box::new(
            file_layer(config, ROOT_LOG_FILE, &mut guards).with_filter(root_filter),
        ));

        for component in COMPONENT_LOGS {
            let mut targets = Targets::new();
            for target in component.targets {
                targets = targets.with_target(*target, LevelFilter::TRACE);
            }
            layers.push(Box::new(
                file_layer(config, component.file_name, &mut guards).with_filter(targets),
            ));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            "File logging initialized: {} (root) + {} component log files",
            ROOT_LOG_FILE,
            COMPONENT_LOGS.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}
