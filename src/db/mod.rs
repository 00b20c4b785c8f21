//! Database module: models, schema and the pool-owning store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows, plus the aggregate stats payload
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: `PriceStore`, the only component that talks to the pool

pub mod models;
pub mod schema;
pub mod store;

pub use models::{AggregateStats, DbPriceRecord};
pub use schema::SQLITE_INIT;
pub use store::PriceStore;
