use std::fmt;

/// Input rejected before any network call is attempted
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    UnknownFilter(String),
    UnknownVehicleClass(String),
    InvalidPage(u32),
    InvalidPageSize(u32),
    MissingCredentials,
    UnknownVehicle(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::LatitudeOutOfRange(lat) => {
                write!(f, "latitude must be within [-90, 90], got {}", lat)
            }
            ValidationError::LongitudeOutOfRange(lon) => {
                write!(f, "longitude must be within [-180, 180], got {}", lon)
            }
            ValidationError::UnknownFilter(s) => {
                write!(f, "unknown filter '{}': expected all, yellow or black", s)
            }
            ValidationError::UnknownVehicleClass(s) => {
                write!(f, "unknown vehicle class '{}': expected yellow or black", s)
            }
            ValidationError::InvalidPage(p) => write!(f, "page must be at least 1, got {}", p),
            ValidationError::InvalidPageSize(s) => {
                write!(f, "page size must be at least 1, got {}", s)
            }
            ValidationError::MissingCredentials => {
                write!(f, "username and password are required")
            }
            ValidationError::UnknownVehicle(id) => {
                write!(f, "vehicle '{}' is not in the current snapshot", id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
