mod basic;
mod database;
mod pipeline;

pub use basic::BasicConfig;
pub use database::DatabaseConfig;
pub use pipeline::PipelineConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// SQLite pool settings (see `database` table in config.toml).
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Upload size bounds (see `pipeline` table in config.toml).
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PRICEHOUSE_";

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, then
    /// `PRICEHOUSE_`-prefixed environment variables (`__` separates tables).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from all sources and validates it.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), figment::Error> {
        let zero_checks = [
            ("basic.request_timeout_secs", self.basic.request_timeout_secs),
            (
                "database.max_connections",
                u64::from(self.database.max_connections),
            ),
            (
                "database.acquire_timeout_secs",
                self.database.acquire_timeout_secs,
            ),
            ("database.busy_timeout_secs", self.database.busy_timeout_secs),
            (
                "database.statement_timeout_secs",
                self.database.statement_timeout_secs,
            ),
            ("pipeline.max_upload_bytes", self.pipeline.max_upload_bytes),
            ("pipeline.max_payload_bytes", self.pipeline.max_payload_bytes),
        ];
        if let Some((key, _)) = zero_checks.iter().find(|(_, value)| *value == 0) {
            return Err(figment::Error::from(format!("{key} must be greater than 0")));
        }
        if self.database.database_url.trim().is_empty() {
            return Err(figment::Error::from(
                "database.database_url must be set and non-empty".to_string(),
            ));
        }
        Ok(())
    }
}
