use axum::{Json, http::StatusCode, response::IntoResponse};
use pricehouse_codec::CodecError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PricehouseError {
    #[error("invalid archive: {0}")]
    ArchiveFormat(String),

    #[error("no .csv entry found in archive")]
    MissingPayload,

    #[error("line {line}: {reason}")]
    Validation { line: u64, reason: String },

    #[error("no data rows after header")]
    EmptyInput,

    #[error("payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Database operation timed out after {0:?}")]
    DatabaseTimeout(Duration),

    #[error("bad upload: {0}")]
    BadUpload(String),
}

impl PricehouseError {
    /// Stable machine-readable code, also used as the `error.code` response field.
    pub fn kind(&self) -> &'static str {
        match self {
            PricehouseError::ArchiveFormat(_) => "ARCHIVE_FORMAT",
            PricehouseError::MissingPayload => "MISSING_PAYLOAD",
            PricehouseError::Validation { .. } => "VALIDATION",
            PricehouseError::EmptyInput => "EMPTY_INPUT",
            PricehouseError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            PricehouseError::IoError(_) => "IO",
            PricehouseError::DatabaseError(_) | PricehouseError::DatabaseTimeout(_) => {
                "PERSISTENCE"
            }
            PricehouseError::BadUpload(_) => "BAD_UPLOAD",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PricehouseError::ArchiveFormat(_)
            | PricehouseError::MissingPayload
            | PricehouseError::Validation { .. }
            | PricehouseError::EmptyInput
            | PricehouseError::BadUpload(_) => StatusCode::BAD_REQUEST,
            PricehouseError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PricehouseError::IoError(_)
            | PricehouseError::DatabaseError(_)
            | PricehouseError::DatabaseTimeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Persistence failures are ours; everything else was caused by the request.
    pub fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }
}

impl From<CodecError> for PricehouseError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::ArchiveFormat(msg) => PricehouseError::ArchiveFormat(msg),
            CodecError::MissingPayload => PricehouseError::MissingPayload,
            CodecError::PayloadTooLarge { limit } => PricehouseError::PayloadTooLarge { limit },
            CodecError::Validation { line, reason } => PricehouseError::Validation { line, reason },
            CodecError::EmptyInput => PricehouseError::EmptyInput,
            CodecError::Io(e) => PricehouseError::IoError(e),
        }
    }
}

impl IntoResponse for PricehouseError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // Driver and IO details stay in the logs.
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };
        let body = ApiErrorObject {
            code: self.kind().to_string(),
            message,
        };
        (status, Json(ApiErrorBody { inner: body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
