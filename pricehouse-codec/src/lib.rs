pub mod archive;
pub mod error;
pub mod record;

pub use archive::{ArchiveLimits, EXPORT_ENTRY_NAME, extract, pack};
pub use error::CodecError;
pub use record::{InputRecord, StoredRecord, parse, price_from_cents, price_to_cents, serialize};
