use crate::fleet::{FilterSelection, VehicleEntity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

mod controller;

pub use controller::{SnapshotController, SyncState};


/// Vehicle positions answering one nearby query
///
/// Replaced wholesale on every commit. A vehicle that drops out of range
/// disappears simply by being absent from the next snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    /// Filter the query was issued for
    pub filter: FilterSelection,

    /// Issuance generation of the query that produced this snapshot (0 = none yet)
    pub generation: u64,

    /// When the response was committed; None for the initial empty snapshot
    pub fetched_at: Option<DateTime<Utc>>,

    /// Vehicles in backend order, unique by id
    entities: Vec<VehicleEntity>,
}

impl VehicleSnapshot {
    /// Empty snapshot shown before the first response arrives
    pub fn empty(filter: FilterSelection) -> Self {
        Self {
            filter,
            generation: 0,
            fetched_at: None,
            entities: Vec::new(),
        }
    }

    /// Build a snapshot from a backend response.
    ///
    /// Keeps backend order. Duplicate ids collapse to their first occurrence.
    pub fn from_entities(
        filter: FilterSelection,
        generation: u64,
        entities: Vec<VehicleEntity>,
    ) -> Self {
        let mut seen = HashSet::with_capacity(entities.len());
        let mut unique = Vec::with_capacity(entities.len());

        for entity in entities {
            if seen.insert(entity.id.clone()) {
                unique.push(entity);
            } else {
                warn!(vehicle_id = %entity.id, generation, "Dropping duplicate vehicle id");
            }
        }

        Self {
            filter,
            generation,
            fetched_at: Some(Utc::now()),
            entities: unique,
        }
    }

    pub fn entities(&self) -> &[VehicleEntity] {
        &self.entities
    }

    /// Look up a vehicle by id
    pub fn get(&self, id: &str) -> Option<&VehicleEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
