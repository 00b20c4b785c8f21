use crate::server::router::PricehouseState;
use axum::{Router, routing::get};

pub mod extract;
pub mod handlers;

pub const PRICES_PATH: &str = "/api/v0/prices";

/// Multipart field that carries the zip archive.
pub const UPLOAD_FIELD: &str = "file";

/// Attachment name of the exported archive.
pub const EXPORT_FILE_NAME: &str = "data.zip";

pub fn router() -> Router<PricehouseState> {
    Router::new().route(
        PRICES_PATH,
        get(handlers::export_prices_handler).post(handlers::upload_prices_handler),
    )
}
