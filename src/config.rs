//! Runtime configuration for the ledger connection and the HTTP listener.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:corebank.db";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POOL_MIN: u32 = 2;
pub const DEFAULT_POOL_MAX: u32 = 10;
pub const DEFAULT_POOL_INCREMENT: u32 = 2;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid pool configuration: {0}")]
    InvalidPool(String),
}

/// Connection pool sizing.
///
/// `increment` is the number of connections the pool is expected to open
/// when it grows. sqlx grows lazily one connection per waiting request, so
/// the value is validated and reported but does not change pool behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub min: u32,
    pub max: u32,
    pub increment: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_POOL_MIN,
            max: DEFAULT_POOL_MAX,
            increment: DEFAULT_POOL_INCREMENT,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max == 0 {
            return Err(ConfigError::InvalidPool(
                "maximum size must be at least 1".to_string(),
            ));
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidPool(format!(
                "minimum size {} exceeds maximum size {}",
                self.min, self.max
            )));
        }
        if self.increment == 0 {
            return Err(ConfigError::InvalidPool(
                "increment must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the ledger lives and how connections to it are pooled.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// sqlx connect string, e.g. `sqlite:corebank.db`
    pub database_url: String,
    pub pool: PoolConfig,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool: PoolConfig::default(),
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl LedgerConfig {
    /// Configuration for a SQLite database file at `path`.
    pub fn for_path(path: &Path) -> Self {
        Self {
            database_url: format!("sqlite:{}", path.display()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
