//! CSV rows <-> price records.
//!
//! Input rows are `id,name,category,price,create_date` with the date as `YYYY-MM-DD`; the `id`
//! column is a placeholder and is ignored. A single bad row fails the whole parse.

use crate::error::CodecError;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use std::str::FromStr;

pub const CSV_HEADER: [&str; 5] = ["id", "name", "category", "price", "create_date"];

pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fractional digits kept for every price.
pub const PRICE_SCALE: u32 = 2;

/// Largest price a `NUMERIC(10,2)` column can hold: 99999999.99.
// 9_999_999_999 split into the low and mid 32-bit words.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, PRICE_SCALE);

const FIELD_COUNT: usize = CSV_HEADER.len();

/// One validated data row, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub name: String,
    pub category: String,
    /// Always non-negative with scale [`PRICE_SCALE`].
    pub price: Decimal,
    pub create_date: NaiveDate,
}

/// A persisted row as read back for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub create_date: NaiveDateTime,
}

/// Converts a validated price into integer cents.
pub fn price_to_cents(price: Decimal) -> Option<i64> {
    (price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
        * Decimal::ONE_HUNDRED)
        .to_i64()
}

pub fn price_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_SCALE)
}

/// Parses a CSV payload, skipping the header row.
pub fn parse(csv_bytes: &[u8]) -> Result<Vec<InputRecord>, CodecError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_bytes);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| {
            let line = e.position().map_or(0, csv::Position::line);
            CodecError::validation(line, e.to_string())
        })?;
        let line = row.position().map_or(0, csv::Position::line);
        records.push(parse_row(&row, line)?);
    }

    if records.is_empty() {
        return Err(CodecError::EmptyInput);
    }
    Ok(records)
}

fn parse_row(row: &StringRecord, line: u64) -> Result<InputRecord, CodecError> {
    if row.len() != FIELD_COUNT {
        return Err(CodecError::validation(
            line,
            format!("expected {FIELD_COUNT} fields, got {}", row.len()),
        ));
    }

    let name = required_text(row, 1, "name", line)?;
    let category = required_text(row, 2, "category", line)?;
    let price = parse_price(&row[3], line)?;

    let create_date = parse_date(&row[4], line)?;

    Ok(InputRecord {
        name,
        category,
        price,
        create_date,
    })
}

fn required_text(
    row: &StringRecord,
    index: usize,
    field: &str,
    line: u64,
) -> Result<String, CodecError> {
    let value = &row[index];
    if value.trim().is_empty() {
        return Err(CodecError::validation(line, format!("{field} is empty")));
    }
    Ok(value.to_string())
}

/// Strict `YYYY-MM-DD`: chrono alone also takes unpadded fields and signed years.
fn parse_date(raw: &str, line: u64) -> Result<NaiveDate, CodecError> {
    let raw = raw.trim();
    let well_formed = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(CodecError::validation(
            line,
            format!("invalid date {raw:?}: expected YYYY-MM-DD"),
        ));
    }

    NaiveDate::parse_from_str(raw, INPUT_DATE_FORMAT)
        .map_err(|e| CodecError::validation(line, format!("invalid date {raw:?}: {e}")))
}

fn parse_price(raw: &str, line: u64) -> Result<Decimal, CodecError> {
    let raw = raw.trim();
    // Decimal::from_str skips digit separators.
    if raw.contains('_') {
        return Err(CodecError::validation(line, format!("invalid price {raw:?}")));
    }
    let price = Decimal::from_str(raw)
        .map_err(|e| CodecError::validation(line, format!("invalid price {raw:?}: {e}")))?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(CodecError::validation(line, format!("price {raw} is negative")));
    }

    let mut price =
        price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if price > MAX_PRICE {
        return Err(CodecError::validation(
            line,
            format!("price {raw} exceeds {MAX_PRICE}"),
        ));
    }
    price.set_sign_positive(true);
    price.rescale(PRICE_SCALE);
    Ok(price)
}

/// Serializes stored records under a `id,name,category,price,create_date` header.
pub fn serialize(records: &[StoredRecord]) -> Result<Vec<u8>, CodecError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_io)?;

    for record in records {
        writer
            .write_record([
                record.id.to_string().as_str(),
                record.name.as_str(),
                record.category.as_str(),
                format!("{:.2}", record.price).as_str(),
                record
                    .create_date
                    .format(EXPORT_TIMESTAMP_FORMAT)
                    .to_string()
                    .as_str(),
            ])
            .map_err(csv_io)?;
    }

    writer
        .into_inner()
        .map_err(|e| CodecError::Io(e.into_error()))
}

fn csv_io(e: csv::Error) -> CodecError {
    CodecError::Io(std::io::Error::other(e))
}
