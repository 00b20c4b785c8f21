//! Upload and export pipelines over the codec and the store.
//!
//! Upload: extract -> parse -> insert+aggregate. Export: fetch -> serialize -> pack.
//! Stages fail fast and their error kind reaches the caller unchanged.

use crate::db::{AggregateStats, PriceStore};
use crate::error::PricehouseError;
use pricehouse_codec::{ArchiveLimits, archive, record};
use tracing::debug;

#[derive(Clone)]
pub struct PricePipeline {
    store: PriceStore,
    limits: ArchiveLimits,
}

impl PricePipeline {
    pub fn new(store: PriceStore, limits: ArchiveLimits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    /// Persists every row of the archive's CSV entry, or nothing at all.
    pub async fn handle_upload(
        &self,
        archive_bytes: &[u8],
    ) -> Result<AggregateStats, PricehouseError> {
        let csv_bytes = archive::extract(archive_bytes, self.limits)?;
        debug!(
            archive_bytes = archive_bytes.len(),
            csv_bytes = csv_bytes.len(),
            "CSV payload extracted"
        );

        let records = record::parse(&csv_bytes)?;
        debug!(rows = records.len(), "CSV rows validated");

        self.store.insert_and_aggregate(&records).await
    }

    /// Packs the whole table as a `data.csv` archive.
    pub async fn handle_export(&self) -> Result<Vec<u8>, PricehouseError> {
        let records = self.store.fetch_all().await?;
        let csv_bytes = record::serialize(&records)?;
        let archive_bytes = archive::pack(&csv_bytes)?;

        debug!(
            rows = records.len(),
            csv_bytes = csv_bytes.len(),
            archive_bytes = archive_bytes.len(),
            "Export archive packed"
        );
        Ok(archive_bytes)
    }
}
