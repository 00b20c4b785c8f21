use crate::config::DatabaseConfig;
use crate::db::models::{AggregateStats, DbAggregateRow, DbPriceRecord};
use crate::db::schema::SQLITE_INIT;
use crate::error::PricehouseError;
use chrono::NaiveTime;
use pricehouse_codec::{InputRecord, StoredRecord, price_to_cents};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::{future::Future, str::FromStr, time::Duration};
use tracing::{debug, info};

/// Owns the connection pool for the `prices` table.
///
/// Built once at startup and cloned into request state; clones share the pool. Uploads take a
/// pool connection for the length of their transaction and no other cross-request locking is
/// done, so concurrent uploads commit in whatever order SQLite grants the write lock.
#[derive(Clone)]
pub struct PriceStore {
    pool: SqlitePool,
    statement_timeout: Duration,
}

impl PriceStore {
    /// Opens the pool and applies the schema.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, PricehouseError> {
        let connect_opts = SqliteConnectOptions::from_str(cfg.database_url.as_str())?
            .create_if_missing(true)
            .busy_timeout(cfg.busy_timeout())
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout())
            .connect_with(connect_opts)
            .await?;

        let store = Self {
            pool,
            statement_timeout: cfg.statement_timeout(),
        };
        store.ensure_schema().await?;

        info!(
            max_connections = cfg.max_connections,
            statement_timeout_secs = cfg.statement_timeout_secs,
            "PriceStore initialized"
        );
        Ok(store)
    }

    /// Creates the `prices` table and its index if absent. Never drops or alters data.
    pub async fn ensure_schema(&self) -> Result<(), PricehouseError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Inserts every record and computes whole-table stats in one transaction.
    ///
    /// Any failure before commit drops the transaction, which rolls it back. The statement
    /// deadline covers the inserts and the aggregate read but not the commit itself, so a
    /// commit that went through is never reported as failed.
    pub async fn insert_and_aggregate(
        &self,
        records: &[InputRecord],
    ) -> Result<AggregateStats, PricehouseError> {
        let (tx, stats) = self
            .with_deadline(async {
                let mut tx = self.pool.begin().await?;
                for record in records {
                    insert_record(&mut tx, record).await?;
                }

                let row = sqlx::query_as::<_, DbAggregateRow>(
                    r#"
                SELECT
                    COUNT(*) AS total_items,
                    COUNT(DISTINCT category) AS total_categories,
                    COALESCE(SUM(price_cents), 0) AS total_price_cents
                FROM prices
                "#,
                )
                .fetch_one(&mut *tx)
                .await?;

                Ok::<_, PricehouseError>((tx, AggregateStats::from(row)))
            })
            .await?;

        tx.commit().await?;

        debug!(
            inserted = records.len(),
            total_items = stats.total_items,
            "price batch committed"
        );
        Ok(stats)
    }

    /// Every stored record, ordered by id ascending. Empty table yields an empty vec.
    pub async fn fetch_all(&self) -> Result<Vec<StoredRecord>, PricehouseError> {
        let rows = self
            .with_deadline(async {
                let rows = sqlx::query_as::<_, DbPriceRecord>(
                    r#"
                SELECT id, name, category, price_cents, create_date
                FROM prices
                ORDER BY id
                "#,
                )
                .fetch_all(&self.pool)
                .await?;
                Ok::<_, PricehouseError>(rows)
            })
            .await?;

        Ok(rows.into_iter().map(StoredRecord::from).collect())
    }

    /// Closes the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn with_deadline<T, F>(&self, op: F) -> Result<T, PricehouseError>
    where
        F: Future<Output = Result<T, PricehouseError>>,
    {
        tokio::time::timeout(self.statement_timeout, op)
            .await
            .map_err(|_| PricehouseError::DatabaseTimeout(self.statement_timeout))?
    }
}

async fn insert_record(
    tx: &mut Transaction<'static, Sqlite>,
    record: &InputRecord,
) -> Result<(), PricehouseError> {
    let price_cents = price_to_cents(record.price).ok_or_else(|| {
        sqlx::Error::Encode(format!("price {} does not fit in cents", record.price).into())
    })?;

    sqlx::query(
        r#"
    INSERT INTO prices (name, category, price_cents, create_date)
    VALUES (?, ?, ?, ?)
    "#,
    )
    .bind(&record.name)
    .bind(&record.category)
    .bind(price_cents)
    .bind(record.create_date.and_time(NaiveTime::MIN))
    .execute(&mut **tx)
    .await?;

    Ok(())
}
