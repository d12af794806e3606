//! HTTP listener settings.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use super::error::ValidationError;

/// Where the server listens and which browser origins may call it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,

    /// Comma-separated list. Unset, empty or `*` allows any origin.
    pub allowed_origins: Option<String>,
}

/// Deployment environment the server believes it is running in.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Origins from `allowed_origins`, trimmed, blanks dropped.
    pub fn origins(&self) -> Vec<String> {
        let Some(raw) = self.allowed_origins.as_deref() else {
            return Vec::new();
        };
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            environment: Environment::Development,
            allowed_origins: None,
        }
    }
}
