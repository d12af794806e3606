//! WebSocket message types pushed to maintenance subscribers.
//!
//! There is one payload shape on the wire, the current-state object:
//!
//! ```json
//! {"active": true, "status": "imminent", "scheduled_start": "...", "scheduled_end": null}
//! ```
//!
//! Relayed test messages keep every field the client sent and get the same
//! four keys filled in when missing.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::maintenance::StatusPayload;

/// Keys every outbound message carries, with their relay defaults.
const STATE_DEFAULTS: [(&str, Value); 4] = [
    ("active", Value::Bool(false)),
    ("status", Value::Null),
    ("scheduled_start", Value::Null),
    ("scheduled_end", Value::Null),
];

/// A message queued for delivery to every member of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupMessage {
    /// Current state of an application's maintenance event.
    Status(StatusPayload),

    /// Test message from a client, re-broadcast verbatim.
    Relay(Map<String, Value>),
}

impl GroupMessage {
    /// Wraps a client test message, defaulting the current-state keys.
    pub fn relay(mut fields: Map<String, Value>) -> Self {
        for (key, default) in STATE_DEFAULTS {
            fields.entry(key).or_insert(default);
        }
        GroupMessage::Relay(fields)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<StatusPayload> for GroupMessage {
    fn from(payload: StatusPayload) -> Self {
        GroupMessage::Status(payload)
    }
}
