//! Tracing output settings.

use serde::Deserialize;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is not set.
    pub filter: String,

    /// Unset picks JSON in production and pretty output elsewhere.
    pub format: Option<LogFormat>,
}

impl LoggingConfig {
    pub fn format_for(&self, production: bool) -> LogFormat {
        match (self.format, production) {
            (Some(format), _) => format,
            (None, true) => LogFormat::Json,
            (None, false) => LogFormat::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,maintenance_beacon=debug,sqlx=warn,tower_http=info".to_string(),
            format: None,
        }
    }
}
