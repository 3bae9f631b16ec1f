// Fleet domain model: vehicles, filters, coordinates

mod entity;
mod filter;
mod position;
mod validation;

pub use entity::{DisplayName, VehicleClass, VehicleEntity};
pub use filter::FilterSelection;
pub use position::Coordinates;
pub use validation::ValidationError;
