use super::{Coordinates, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle class as tagged by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    #[serde(rename = "yellow")]
    ClassA,
    #[serde(rename = "black")]
    ClassB,
}

impl VehicleClass {
    /// Backend `taxiType` tag
    pub fn tag(&self) -> &'static str {
        match self {
            VehicleClass::ClassA => "yellow",
            VehicleClass::ClassB => "black",
        }
    }

    /// Parse a backend `taxiType` tag (case-insensitive)
    pub fn from_tag(tag: &str) -> Result<Self, ValidationError> {
        match tag.trim().to_lowercase().as_str() {
            "yellow" => Ok(VehicleClass::ClassA),
            "black" => Ok(VehicleClass::ClassB),
            _ => Err(ValidationError::UnknownVehicleClass(tag.to_string())),
        }
    }

    /// Badge label shown next to the driver
    pub fn label(&self) -> &'static str {
        match self {
            VehicleClass::ClassA => "Yellow Taxi",
            VehicleClass::ClassB => "Black Taxi",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayName {
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A vehicle on the map
///
/// `id` is the identity key the view uses to reuse marker instances.
/// It is unique within one snapshot; continuity across snapshots is not
/// assumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleEntity {
    pub id: String,
    pub position: Coordinates,
    pub display_name: DisplayName,
    pub plate: String,
    pub vehicle_class: VehicleClass,

    /// Present on listing records only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,

    /// Backend-computed distance from the observer (nearby query only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}
