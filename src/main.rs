use anyhow::{Context, Result};
use fleet_sync::config::{load_config, FleetConfig};
use fleet_sync::view::TracingView;
use fleet_sync::{FilterSelection, FleetSync, SyncState};
use std::sync::Arc;
use tracing::{info, warn};

/// Usage: fleet-sync [all|yellow|black]
///
/// Reads `FLEET_CONFIG` (TOML path), `FLEET_USERNAME` and `FLEET_PASSWORD`.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_sync=info".into()),
        )
        .init();

    let config = match std::env::var("FLEET_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => FleetConfig::default(),
    }
    .with_env_overrides();

    let fleet = FleetSync::from_config(config, Arc::new(TracingView))?;

    if !fleet.is_authenticated() {
        let username = std::env::var("FLEET_USERNAME").context("FLEET_USERNAME not set")?;
        let password = std::env::var("FLEET_PASSWORD").context("FLEET_PASSWORD not set")?;
        fleet
            .login(&username, &password)
            .await
            .context("Login failed")?;
    }

    let map = fleet.open_map().await.context("Invalid observer position")?;

    if let Some(arg) = std::env::args().nth(1) {
        let filter: FilterSelection = arg.parse().context("Invalid filter argument")?;
        if filter != map.current_filter() {
            map.set_filter(filter).await;
        }
    }

    match map.state() {
        SyncState::Ready => info!(
            filter = %map.current_filter(),
            vehicles = map.snapshot().len(),
            "Fleet view ready"
        ),
        SyncState::Failed => warn!(
            error = map.last_error().as_deref().unwrap_or("unknown"),
            "Showing stale fleet data"
        ),
        state => warn!(state = ?state, "Fleet view not ready"),
    }

    Ok(())
}
