use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("invalid archive: {0}")]
    ArchiveFormat(String),

    #[error("no .csv entry found in archive")]
    MissingPayload,

    #[error("extracted payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("line {line}: {reason}")]
    Validation { line: u64, reason: String },

    #[error("no data rows after header")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn validation(line: u64, reason: impl Into<String>) -> Self {
        CodecError::Validation {
            line,
            reason: reason.into(),
        }
    }
}

impl From<zip::result::ZipError> for CodecError {
    fn from(e: zip::result::ZipError) -> Self {
        CodecError::ArchiveFormat(e.to_string())
    }
}
