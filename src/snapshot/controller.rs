use crate::client::{ApiError, FleetApi};
use crate::fleet::{Coordinates, FilterSelection, VehicleEntity};
use crate::guard::SessionGuard;
use crate::snapshot::VehicleSnapshot;
use crate::view::FleetView;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};


/// Fetch lifecycle as seen by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; the previous snapshot is still shown
    Failed,
}

struct ControllerState {
    filter: FilterSelection,
    sync_state: SyncState,
    snapshot: Arc<VehicleSnapshot>,
    /// Generation of the most recently issued query
    latest_issued: u64,
    /// Generation of the snapshot currently committed
    committed: u64,
    /// Highest generation whose outcome (success or failure) has arrived
    latest_arrived: u64,
    last_error: Option<String>,
}

/// Owns the filter selection and the latest vehicle snapshot.
///
/// Every `set_filter`/`refresh` issues exactly one nearby query tagged with a
/// monotonically increasing generation. Responses commit last-writer-wins by
/// issuance order: a success older than any outcome already received
/// (committed snapshot or newer failure) is dropped, whatever order the
/// responses arrive in.
pub struct SnapshotController {
    api: Arc<dyn FleetApi>,
    guard: Arc<SessionGuard>,
    view: Arc<dyn FleetView>,
    observer: Coordinates,
    state: Mutex<ControllerState>,
}

impl SnapshotController {
    /// Create an idle controller. No query is issued until `refresh` or `set_filter`.
    pub fn new(
        api: Arc<dyn FleetApi>,
        guard: Arc<SessionGuard>,
        view: Arc<dyn FleetView>,
        observer: Coordinates,
        filter: FilterSelection,
    ) -> Self {
        Self {
            api,
            guard,
            view,
            observer,
            state: Mutex::new(ControllerState {
                filter,
                sync_state: SyncState::Idle,
                snapshot: Arc::new(VehicleSnapshot::empty(filter)),
                latest_issued: 0,
                committed: 0,
                latest_arrived: 0,
                last_error: None,
            }),
        }
    }

    /// Make `filter` active and fetch for it
    pub async fn set_filter(&self, filter: FilterSelection) -> SyncState {
        self.fetch(filter).await
    }

    /// Re-fetch for the current filter
    pub async fn refresh(&self) -> SyncState {
        let filter = self.current_filter();
        self.fetch(filter).await
    }

    pub fn current_filter(&self) -> FilterSelection {
        self.lock().filter
    }

    pub fn state(&self) -> SyncState {
        self.lock().sync_state
    }

    /// Latest committed snapshot
    pub fn snapshot(&self) -> Arc<VehicleSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Message of the transport failure behind `SyncState::Failed`
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn observer(&self) -> Coordinates {
        self.observer
    }

    async fn fetch(&self, filter: FilterSelection) -> SyncState {
        let generation = self.begin(filter);
        let result = self.api.query_nearby(self.observer, filter).await;
        self.complete(generation, filter, result)
    }

    /// Issue phase: activate `filter`, take the next generation, enter `Loading`
    pub(crate) fn begin(&self, filter: FilterSelection) -> u64 {
        let (generation, changed) = {
            let mut state = self.lock();
            state.latest_issued += 1;
            state.filter = filter;
            let changed = state.sync_state != SyncState::Loading;
            state.sync_state = SyncState::Loading;
            (state.latest_issued, changed)
        };

        info!(filter = %filter, generation, "Issuing nearby query");
        if changed {
            self.view.on_sync_state(SyncState::Loading);
        }
        generation
    }

    /// Commit phase: apply a query result under the last-writer-wins rule
    pub(crate) fn complete(
        &self,
        generation: u64,
        filter: FilterSelection,
        result: Result<Vec<VehicleEntity>, ApiError>,
    ) -> SyncState {
        let mut state = self.lock();
        let is_latest = generation == state.latest_issued;
        let previous = state.sync_state;
        let newest_seen = state.committed.max(state.latest_arrived);
        state.latest_arrived = newest_seen.max(generation);

        match result {
            Ok(entities) => {
                if generation <= newest_seen {
                    debug!(
                        generation,
                        newest_seen,
                        "Discarding stale nearby response"
                    );
                    return state.sync_state;
                }

                let snapshot = Arc::new(VehicleSnapshot::from_entities(filter, generation, entities));
                state.snapshot = Arc::clone(&snapshot);
                state.committed = generation;
                if is_latest {
                    state.sync_state = SyncState::Ready;
                    state.last_error = None;
                }
                let current = state.sync_state;
                drop(state);

                info!(
                    filter = %filter,
                    generation,
                    vehicles = snapshot.len(),
                    "Committed vehicle snapshot"
                );
                self.view.on_snapshot(snapshot);
                self.notify_if_changed(previous, current);
                current
            }
            Err(ApiError::Auth(msg)) => {
                if is_latest {
                    state.sync_state = SyncState::Idle;
                }
                let current = state.sync_state;
                drop(state);

                warn!(generation, error = %msg, "Nearby query rejected by backend");
                self.guard.handle_auth_failure();
                self.notify_if_changed(previous, current);
                current
            }
            Err(e) => {
                if !is_latest {
                    debug!(generation, error = %e, "Ignoring failure of superseded query");
                    return state.sync_state;
                }

                state.sync_state = SyncState::Failed;
                state.last_error = Some(e.to_string());
                let kept = state.snapshot.len();
                drop(state);

                warn!(
                    generation,
                    error = %e,
                    kept_vehicles = kept,
                    "Nearby query failed, keeping last snapshot"
                );
                self.notify_if_changed(previous, SyncState::Failed);
                SyncState::Failed
            }
        }
    }

    fn notify_if_changed(&self, previous: SyncState, current: SyncState) {
        if previous != current {
            self.view.on_sync_state(current);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
