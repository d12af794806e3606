//! PostgreSQL settings. Leaving `url` unset runs the server on the
//! in-memory store instead.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool: PoolConfig,

    /// Apply pending migrations before serving.
    pub run_migrations: bool,
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub min: u32,
    pub max: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// The connection URL, if one was given and is not blank.
    pub fn postgres_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let Some(url) = self.postgres_url() else {
            return Ok(());
        };
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        self.pool.validate()
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.min > self.max {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge(MAX_POOL_SIZE));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min: 1,
            max: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}
