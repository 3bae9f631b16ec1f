use super::{ValidationError, VehicleClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Active vehicle-class filter for the nearby query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterSelection {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "yellow")]
    ClassA,
    #[serde(rename = "black")]
    ClassB,
}

impl FilterSelection {
    /// Class tag sent as `taxiType`, or None when the parameter must be omitted
    pub fn tag(&self) -> Option<&'static str> {
        self.vehicle_class().map(|class| class.tag())
    }

    /// Vehicle class this filter restricts to
    pub fn vehicle_class(&self) -> Option<VehicleClass> {
        match self {
            FilterSelection::All => None,
            FilterSelection::ClassA => Some(VehicleClass::ClassA),
            FilterSelection::ClassB => Some(VehicleClass::ClassB),
        }
    }
}

impl From<VehicleClass> for FilterSelection {
    fn from(class: VehicleClass) -> Self {
        match class {
            VehicleClass::ClassA => FilterSelection::ClassA,
            VehicleClass::ClassB => FilterSelection::ClassB,
        }
    }
}

impl FromStr for FilterSelection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized == "all" {
            return Ok(FilterSelection::All);
        }
        VehicleClass::from_tag(&normalized)
            .map(FilterSelection::from)
            .map_err(|_| ValidationError::UnknownFilter(s.to_string()))
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag().unwrap_or("all"))
    }
}
