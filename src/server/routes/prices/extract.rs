use super::UPLOAD_FIELD;
use crate::error::PricehouseError;
use crate::server::router::PricehouseState;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::StatusCode,
};
use tracing::debug;

/// The zip archive sent in the `file` field of a multipart upload.
pub(crate) struct ArchiveUpload {
    pub(crate) file_name: Option<String>,
    pub(crate) bytes: Bytes,
}

impl FromRequest<PricehouseState> for ArchiveUpload {
    type Rejection = PricehouseError;

    /// Reads multipart fields until `file` is found; other fields are skipped.
    ///
    /// A non-multipart request or a form without `file` is `BadUpload`; a body over the
    /// configured limit is `PayloadTooLarge`.
    async fn from_request(req: Request, state: &PricehouseState) -> Result<Self, Self::Rejection> {
        let limit = state.max_upload_bytes;
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| PricehouseError::BadUpload(rejection.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, limit))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                debug!(field = ?field.name(), "Skipping unrelated multipart field");
                continue;
            }

            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
            return Ok(Self { file_name, bytes });
        }

        Err(PricehouseError::BadUpload(format!(
            "missing multipart field `{UPLOAD_FIELD}`"
        )))
    }
}

fn multipart_error(e: MultipartError, limit: u64) -> PricehouseError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PricehouseError::PayloadTooLarge { limit }
    } else {
        PricehouseError::BadUpload(e.body_text())
    }
}
