//! # UAV Relay
//!
//! Entry point for the relay process.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging, metrics)
//! 2. Load configuration from the environment, exit if the secret is missing
//! 3. Build and start the runtime
//! 4. Run until Ctrl-C, then shut down gracefully

use anyhow::{Context, Result};
use relay_runtime::container::RelayConfig;
use relay_runtime::RelayRuntime;
use relay_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = RelayConfig::from_env().context("Failed to load relay configuration")?;
    config
        .validate()
        .context("Relay configuration rejected")?;

    let runtime = RelayRuntime::from_config(config).await?;
    runtime.start().await?;

    info!("Relay is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
