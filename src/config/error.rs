//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A setting that parsed but makes no sense.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.port must be non-zero")]
    InvalidPort,

    #[error("database.url must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("database.pool.min exceeds database.pool.max")]
    InvalidPoolSize,

    #[error("database.pool.max exceeds {0}")]
    PoolSizeTooLarge(u32),

    #[error("database.pool.acquire_timeout_secs must be non-zero")]
    InvalidTimeout,

    #[error("websocket.outbound_buffer must be at least 1")]
    InvalidOutboundBuffer,

    #[error("websocket.max_message_bytes must be at least 1")]
    InvalidMessageSize,
}
