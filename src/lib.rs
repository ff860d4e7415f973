pub mod alerts;
pub mod feed;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod trend;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

use session::{MonitorController, MonitorEvent};
use settings::{MonitorSettings, SettingsStore};

const DEFAULT_SETTINGS_PATH: &str = "heartwatch.json";

/// Runs a simulated monitoring session until Ctrl-C.
pub fn run() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Heartwatch starting up...");

    let settings_path = std::env::var_os("HEARTWATCH_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let store = SettingsStore::new(settings_path)?;
    let settings = store.monitor().with_env_overrides();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(run_session(settings))
}

async fn run_session(settings: MonitorSettings) -> Result<()> {
    let controller = MonitorController::new(&settings);
    let mut events = controller.subscribe();

    let snapshot = controller.get_snapshot().await;
    info!(
        "Session {} ready: {} bpm, threshold {}, {}",
        snapshot.state.id,
        snapshot.state.latest_bpm,
        snapshot.state.alert_config.threshold(),
        snapshot.alert.text
    );

    controller.start_monitoring().await;
    controller.start_sync().await?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    warn!("Failed to listen for Ctrl-C: {err}");
                }
                info!("Shutting down session {}", snapshot.state.id);
                break;
            }
            received = events.recv() => match received {
                Ok(event) => log_event(&event)?,
                Err(RecvError::Lagged(skipped)) => warn!("Event log lagged, skipped {skipped} events"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

fn log_event(event: &MonitorEvent) -> Result<()> {
    let payload = serde_json::to_string(event).context("failed to serialize event")?;
    info!("[{}] {}", event.name(), payload);
    Ok(())
}
