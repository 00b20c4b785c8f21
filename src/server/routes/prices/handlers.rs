use super::{EXPORT_FILE_NAME, extract::ArchiveUpload};
use crate::db::AggregateStats;
use crate::error::PricehouseError;
use crate::server::router::PricehouseState;
use axum::{
    Json,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

const ZIP_CONTENT_TYPE: &str = "application/zip";

/// POST /api/v0/prices
pub(super) async fn upload_prices_handler(
    State(state): State<PricehouseState>,
    upload: ArchiveUpload,
) -> Result<Json<AggregateStats>, PricehouseError> {
    info!(
        file_name = %upload.file_name.as_deref().unwrap_or("<none>"),
        size = upload.bytes.len(),
        "Processing archive"
    );

    let stats = state
        .pipeline
        .handle_upload(&upload.bytes)
        .await
        .inspect_err(|e| log_failure("upload", e))?;

    info!(
        total_items = stats.total_items,
        total_categories = stats.total_categories,
        total_price = %stats.total_price,
        "Price upload committed"
    );
    Ok(Json(stats))
}

/// GET /api/v0/prices
pub(super) async fn export_prices_handler(
    State(state): State<PricehouseState>,
) -> Result<Response, PricehouseError> {
    let archive = state
        .pipeline
        .handle_export()
        .await
        .inspect_err(|e| log_failure("export", e))?;

    let disposition = format!("attachment; filename={EXPORT_FILE_NAME}");
    let length = archive.len().to_string();
    Ok((
        [
            (CONTENT_TYPE, ZIP_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, disposition),
            (CONTENT_LENGTH, length),
        ],
        archive,
    )
        .into_response())
}

fn log_failure(op: &str, e: &PricehouseError) {
    if e.is_server_fault() {
        error!(op, kind = e.kind(), error = %e, "Price pipeline failed");
    } else {
        warn!(op, kind = e.kind(), error = %e, "Price pipeline rejected request");
    }
}
