//! Wires session store, API client, session guard and snapshot controller
//! into one dashboard session.

use crate::client::{ApiClient, ApiError, FleetApi};
use crate::config::FleetConfig;
use crate::fleet::{ValidationError, VehicleEntity};
use crate::guard::SessionGuard;
use crate::session::{SessionStatus, SessionStore};
use crate::snapshot::SnapshotController;
use crate::view::FleetView;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[cfg(test)]
mod tests;

/// Minutes quoted to the operator by the pickup stub
pub const PICKUP_ETA_MINUTES: u32 = 3;

/// Acknowledgement of a pickup request.
///
/// Purely a notification: nothing is dispatched or reserved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupNotice {
    pub vehicle_id: String,
    pub driver_first_name: String,
    pub plate: String,
    pub eta_minutes: u32,
}

impl fmt::Display for PickupNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is on the way! Arriving in {} minutes.",
            self.driver_first_name, self.eta_minutes
        )
    }
}

pub struct FleetSync {
    config: FleetConfig,
    session: Arc<SessionStore>,
    client: Arc<ApiClient>,
    guard: Arc<SessionGuard>,
    view: Arc<dyn FleetView>,
}

impl FleetSync {
    /// Build all components from config. Restores a persisted session if configured.
    pub fn from_config(config: FleetConfig, view: Arc<dyn FleetView>) -> Result<Self> {
        let session = Arc::new(SessionStore::open(&config.session)?);
        let client = Arc::new(ApiClient::new(&config.api, Arc::clone(&session))?);
        let guard = Arc::new(SessionGuard::new(Arc::clone(&session), Arc::clone(&view)));

        info!(
            base_url = %client.base_url(),
            session = ?session.status(),
            "Fleet sync initialized"
        );

        Ok(Self {
            config,
            session,
            client,
            guard,
            view,
        })
    }

    /// Log in and install the credential.
    ///
    /// A rejected login leaves the store untouched and is not routed to the
    /// session guard; the operator is already on the login screen.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let credential = self.client.login(username, password).await?;
        self.session.set(credential);
        info!(username = %username, "Operator logged in");
        Ok(())
    }

    /// Explicit logout. Returns true if a session was active.
    pub fn logout(&self) -> bool {
        let was_active = self.session.clear();
        info!(was_active, "Operator logged out");
        was_active
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.status() == SessionStatus::Authenticated && self.session.get().is_some()
    }

    /// Build the snapshot controller for the configured observer and run the
    /// initial fetch. Fetch failures are reported through the view, not here.
    pub async fn open_map(&self) -> Result<Arc<SnapshotController>, ValidationError> {
        let observer = self.config.observer.coordinates()?;
        let api: Arc<dyn FleetApi> = self.client.clone();
        let controller = Arc::new(SnapshotController::new(
            api,
            Arc::clone(&self.guard),
            Arc::clone(&self.view),
            observer,
            self.config.observer.filter,
        ));
        controller.refresh().await;
        Ok(controller)
    }

    /// Bulk listing; auth failures expire the session like any other endpoint
    pub async fn list_drivers(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<VehicleEntity>, ApiError> {
        self.guard
            .observe(self.client.list_drivers(page, page_size).await)
    }

    /// Listing page from config (`[listing]`)
    pub async fn list_default_page(&self) -> Result<Vec<VehicleEntity>, ApiError> {
        let listing = &self.config.listing;
        self.list_drivers(listing.page, listing.page_size).await
    }

    /// Stub pickup request for a vehicle in the current snapshot
    pub fn request_pickup(
        &self,
        controller: &SnapshotController,
        vehicle_id: &str,
    ) -> Result<PickupNotice, ValidationError> {
        let snapshot = controller.snapshot();
        let vehicle = snapshot
            .get(vehicle_id)
            .ok_or_else(|| ValidationError::UnknownVehicle(vehicle_id.to_string()))?;

        let notice = PickupNotice {
            vehicle_id: vehicle.id.clone(),
            driver_first_name: vehicle.display_name.first_name.clone(),
            plate: vehicle.plate.clone(),
            eta_minutes: PICKUP_ETA_MINUTES,
        };
        info!(vehicle_id = %notice.vehicle_id, plate = %notice.plate, "{}", notice);
        Ok(notice)
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }
}
