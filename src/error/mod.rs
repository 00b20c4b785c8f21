mod pricehouse;

pub use pricehouse::{ApiErrorBody, ApiErrorObject, PricehouseError};
