use crate::fleet::{Coordinates, DisplayName, ValidationError, VehicleClass, VehicleEntity};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

/// Vehicle record as returned by `/drivers` and `/drivers/nearby`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub plate: String,
    pub taxi_type: String,
    pub location: LocationRecord,
    #[serde(default)]
    pub car_brand: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LocationRecord {
    pub lat: f64,
    pub lon: f64,
}

/// `POST /login` success body
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl TryFrom<DriverRecord> for VehicleEntity {
    type Error = ValidationError;

    fn try_from(record: DriverRecord) -> Result<Self, Self::Error> {
        let vehicle_class = VehicleClass::from_tag(&record.taxi_type)?;
        let position = Coordinates::new(record.location.lat, record.location.lon)?;

        Ok(VehicleEntity {
            id: record.id,
            position,
            display_name: DisplayName {
                first_name: record.first_name,
                last_name: record.last_name,
            },
            plate: record.plate,
            vehicle_class,
            car_brand: record.car_brand.filter(|s| !s.is_empty()),
            car_model: record.car_model.filter(|s| !s.is_empty()),
            distance_km: record.distance_km,
        })
    }
}

/// Decode a vehicle list body shared by listing and nearby queries.
///
/// A `null` body is an empty list. Records that fail domain validation are
/// skipped with a warning so one bad row cannot block the whole snapshot.
pub fn decode_vehicles(body: &[u8]) -> Result<Vec<VehicleEntity>, serde_json::Error> {
    let records: Option<Vec<DriverRecord>> = serde_json::from_slice(body)?;

    Ok(records
        .unwrap_or_default()
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match VehicleEntity::try_from(record) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(vehicle_id = %id, error = %e, "Skipping invalid vehicle record");
                    None
                }
            }
        })
        .collect())
}
