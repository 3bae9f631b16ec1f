// Fleet domain model
pub mod fleet;

// Operator session credential
pub mod session;

// Backend HTTP client
pub mod client;

// Forced re-authentication on auth failures
pub mod guard;

// Vehicle snapshots and the filter-driven controller
pub mod snapshot;

// Presentation boundary
pub mod view;

// Configuration
pub mod config;

// Component wiring
pub mod sync;

pub use client::{ApiClient, ApiError};
pub use fleet::{Coordinates, FilterSelection, VehicleClass, VehicleEntity};
pub use snapshot::{SnapshotController, SyncState, VehicleSnapshot};
pub use sync::{FleetSync, PickupNotice};
pub use view::FleetView;
