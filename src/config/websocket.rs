//! Per-subscriber connection limits.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Messages queued per connection before new ones are dropped.
    pub outbound_buffer: usize,

    /// Largest inbound test message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl WebSocketConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_buffer == 0 {
            return Err(ValidationError::InvalidOutboundBuffer);
        }
        if self.max_message_bytes == 0 {
            return Err(ValidationError::InvalidMessageSize);
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: 64,
            max_message_bytes: 16 * 1024,
        }
    }
}
