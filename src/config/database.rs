use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Persistence settings for the SQLite pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database URL for SQLite.
    /// TOML: `database.database_url`. Default: `sqlite://prices.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Pool size; each upload holds one connection for the length of its transaction.
    /// TOML: `database.max_connections`. Default: `8`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a request waits for a free pool connection.
    /// TOML: `database.acquire_timeout_secs`. Default: `5`.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// How long SQLite waits on a locked database before failing.
    /// TOML: `database.busy_timeout_secs`. Default: `5`.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Deadline for one gateway operation (a whole insert transaction or export read).
    /// TOML: `database.statement_timeout_secs`. Default: `15`.
    #[serde(default = "default_statement_timeout_secs")]
    pub statement_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Config for a database URL with every other knob at its default.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            busy_timeout_secs: default_busy_timeout_secs(),
            statement_timeout_secs: default_statement_timeout_secs(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://prices.db".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_statement_timeout_secs() -> u64 {
    15
}
