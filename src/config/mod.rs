//! Typed configuration read from the process environment.
//!
//! Variables use the `MAINTENANCE_BEACON` prefix with `__` between path
//! segments, and a `.env` file is honoured in development:
//!
//! ```text
//! MAINTENANCE_BEACON__SERVER__PORT=8080
//! MAINTENANCE_BEACON__DATABASE__URL=postgres://beacon@localhost/beacon
//! MAINTENANCE_BEACON__DATABASE__POOL__MAX=20
//! MAINTENANCE_BEACON__LOGGING__FORMAT=json
//! MAINTENANCE_BEACON__WEBSOCKET__OUTBOUND_BUFFER=128
//! ```
//!
//! Every section has defaults, so an empty environment yields a development
//! server on the in-memory store.

mod database;
mod error;
mod logging;
mod server;
mod websocket;

pub use database::{DatabaseConfig, PoolConfig};
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use server::{Environment, ServerConfig};
pub use websocket::WebSocketConfig;

use serde::Deserialize;

const ENV_PREFIX: &str = "MAINTENANCE_BEACON";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub websocket: WebSocketConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Loads and validates in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.websocket.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging.format_for(self.is_production())
    }
}
