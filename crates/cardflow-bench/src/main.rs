//! Bench binary for Cardflow.
//!
//! Wires together the demo card engine, the random move selector, the
//! session registry, and the Observer API server, then serves until
//! interrupted. Clients connect to `GET /ws/sessions/{id}` (minting
//! their own UUID) to claim a session and watch automated playthroughs.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `cardflow-config.yaml`
//! 3. Build the snapshot hub and render sink
//! 4. Build the session registry over the demo engine
//! 5. Start the Observer API server
//! 6. Wait for Ctrl-C

mod error;

use std::path::Path;
use std::sync::Arc;

use cardflow_core::config::AppConfig;
use cardflow_core::registry::SessionRegistry;
use cardflow_game::demo::DemoEngineFactory;
use cardflow_game::select::RandomSelector;
use cardflow_observer::server::{ServerConfig, spawn_server};
use cardflow_observer::sink::WsRenderSink;
use cardflow_observer::state::{AppState, SnapshotHub};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::BenchError;

/// Application entry point for the bench.
///
/// # Errors
///
/// Returns an error if configuration loading or server startup fails.
#[tokio::main]
async fn main() -> Result<(), BenchError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("cardflow-bench starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        participant_count = config.session.participant_count,
        step_interval_ms = config.session.step_interval_ms,
        "Configuration loaded"
    );

    // 3. Snapshot hub and render sink.
    let hub = Arc::new(SnapshotHub::new());
    let sink = Arc::new(WsRenderSink::new(Arc::clone(&hub)));

    // 4. Session registry over the demo engine.
    let registry = Arc::new(SessionRegistry::new(
        config.session_defaults(),
        Arc::new(DemoEngineFactory::new()),
        Arc::new(RandomSelector::new()),
        sink,
    ));

    // 5. Start the Observer API server.
    let state = Arc::new(AppState::new(registry, hub));
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let server = spawn_server(server_config, state);
    info!(port = config.server.port, "Observer API server started");

    // 6. Serve until interrupted.
    tokio::select! {
        result = server => {
            match result {
                Ok(outcome) => outcome?,
                Err(e) => info!(error = %e, "server task ended"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received");
        }
    }

    info!("cardflow-bench shutdown complete");
    Ok(())
}

/// Load the application configuration from `cardflow-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// missing file falls back to defaults.
fn load_config() -> Result<AppConfig, BenchError> {
    let config_path = Path::new("cardflow-config.yaml");
    if config_path.exists() {
        Ok(AppConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(AppConfig::default())
    }
}
