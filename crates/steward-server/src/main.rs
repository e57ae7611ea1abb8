//! Main entry point for Steward server.
//!
//! Loads configuration, builds the upstream clients and serves the HTTP API
//! until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use steward_server::{
    model::{AppState, Configuration, Gateways},
    startup,
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let configuration = Configuration::new()?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    // Missing mandatory upstream settings fail here, before the port is bound
    let gateways = Gateways::from_configuration(&configuration)
        .context("invalid upstream configuration")?;
    let orchestration = configuration.orchestration_config()?;
    info!(
        operation_timeout_ms = orchestration.operation_timeout.as_millis() as u64,
        asset_sync = gateways.asset.is_some(),
        "Upstream clients ready"
    );

    let app_state = Arc::new(AppState::new(gateways, &orchestration));

    let address = configuration.server_address();
    let port = configuration.server_port();
    info!("Starting Steward server on {}:{}", address, port);

    let server = startup::http_server(
        app_state,
        configuration.cors_origin(),
        address,
        port,
        configuration.shutdown_timeout(),
    )?;

    let shutdown = startup::wait_for_shutdown_signal();
    tokio::spawn(startup::stop_on_signal(shutdown.subscribe(), server.handle()));

    if let Err(e) = server.await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Steward server shutdown complete");
    Ok(())
}
