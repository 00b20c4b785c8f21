//! Zip container handling for the CSV payload.
//!
//! Uploads carry one `.csv` entry (the first one in container order wins); exports are packed
//! as a single deflated `data.csv` entry.

use crate::error::CodecError;
use std::io::{Cursor, Read, Write};
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

/// Entry name used for exported archives.
pub const EXPORT_ENTRY_NAME: &str = "data.csv";

const CSV_SUFFIX: &str = ".csv";

/// Upper bound on the decompressed size of the extracted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    pub max_payload_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Returns the decompressed bytes of the first entry whose name ends with `.csv`.
///
/// The declared entry size is checked first, then the read itself is capped at
/// `max_payload_bytes + 1` so a lying header cannot inflate past the limit.
pub fn extract(archive_bytes: &[u8], limits: ArchiveLimits) -> Result<Vec<u8>, CodecError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;
    let limit = limits.max_payload_bytes;

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() || !entry.name().ends_with(CSV_SUFFIX) {
            continue;
        }
        if entry.size() > limit {
            return Err(CodecError::PayloadTooLarge { limit });
        }

        let mut payload = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .take(limit.saturating_add(1))
            .read_to_end(&mut payload)
            .map_err(|e| CodecError::ArchiveFormat(format!("failed to inflate entry: {e}")))?;

        if payload.len() as u64 > limit {
            return Err(CodecError::PayloadTooLarge { limit });
        }
        return Ok(payload);
    }

    Err(CodecError::MissingPayload)
}

/// Packs `csv_bytes` into a fresh single-entry archive named [`EXPORT_ENTRY_NAME`].
pub fn pack(csv_bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(EXPORT_ENTRY_NAME, options)?;
    writer.write_all(csv_bytes)?;
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
