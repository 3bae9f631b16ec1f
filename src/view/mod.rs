//! Boundary to the presentation layer (map, markers, login screen).

use crate::snapshot::{SyncState, VehicleSnapshot};
use std::sync::Arc;
use tracing::{info, warn};

/// Callbacks the sync layer delivers to the UI.
///
/// Filter intents flow the other way through
/// [`SnapshotController::set_filter`](crate::snapshot::SnapshotController::set_filter).
pub trait FleetView: Send + Sync {
    /// A new snapshot was committed; render it keyed by vehicle id
    fn on_snapshot(&self, snapshot: Arc<VehicleSnapshot>);

    /// The session is gone; navigate to the login entry point
    fn on_auth_required(&self);

    /// Sync state changed (`Failed` means the map shows stale data)
    fn on_sync_state(&self, _state: SyncState) {}
}

/// View that writes every callback to the log (used by the CLI)
pub struct TracingView;

impl FleetView for TracingView {
    fn on_snapshot(&self, snapshot: Arc<VehicleSnapshot>) {
        info!(
            filter = %snapshot.filter,
            generation = snapshot.generation,
            vehicles = snapshot.len(),
            "Snapshot committed"
        );
        for vehicle in snapshot.entities() {
            info!(
                id = %vehicle.id,
                name = %vehicle.display_name,
                plate = %vehicle.plate,
                class = vehicle.vehicle_class.label(),
                lat = vehicle.position.lat,
                lon = vehicle.position.lon,
                distance_km = ?vehicle.distance_km,
                "Vehicle"
            );
        }
    }

    fn on_auth_required(&self) {
        warn!("Session expired, please log in again");
    }

    fn on_sync_state(&self, state: SyncState) {
        info!(state = ?state, "Sync state changed");
    }
}
