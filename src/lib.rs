pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod server;

pub use db::{AggregateStats, PriceStore};
pub use error::PricehouseError;
pub use pipeline::PricePipeline;
