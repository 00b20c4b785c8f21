use chrono::NaiveDateTime;
use pricehouse_codec::{StoredRecord, price_from_cents};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbPriceRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub create_date: NaiveDateTime,
}

impl From<DbPriceRecord> for StoredRecord {
    fn from(row: DbPriceRecord) -> Self {
        StoredRecord {
            id: row.id,
            name: row.name,
            category: row.category,
            price: price_from_cents(row.price_cents),
            create_date: row.create_date,
        }
    }
}

/// Whole-table statistics as seen by the transaction that produced them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateStats {
    pub total_items: i64,
    pub total_categories: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

#[derive(Debug, FromRow)]
pub(crate) struct DbAggregateRow {
    pub total_items: i64,
    pub total_categories: i64,
    pub total_price_cents: i64,
}

impl From<DbAggregateRow> for AggregateStats {
    fn from(row: DbAggregateRow) -> Self {
        AggregateStats {
            total_items: row.total_items,
            total_categories: row.total_categories,
            total_price: price_from_cents(row.total_price_cents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn db_row_converts_cents_back_to_price() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let stored = StoredRecord::from(DbPriceRecord {
            id: 3,
            name: "Widget".to_string(),
            category: "Tools".to_string(),
            price_cents: 999,
            create_date: created,
        });

        assert_eq!(stored.id, 3);
        assert_eq!(stored.price.to_string(), "9.99");
        assert_eq!(stored.create_date, created);
    }

    #[test]
    fn aggregate_total_serializes_as_json_number() {
        let stats = AggregateStats::from(DbAggregateRow {
            total_items: 2,
            total_categories: 1,
            total_price_cents: 1050,
        });
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"total_items":2,"total_categories":1,"total_price":10.5}"#
        );
    }
}
