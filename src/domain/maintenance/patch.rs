//! Partial updates to maintenance events, restricted to a field whitelist.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::foundation::Timestamp;

use super::errors::MaintenanceError;
use super::event::NewMaintenanceEvent;
use super::status::MaintenanceStatus;

/// Fields that may change after an event is created.
pub const ALLOWED_UPDATE_FIELDS: [&str; 6] = [
    "status",
    "scheduled_start",
    "scheduled_end",
    "started",
    "ended",
    "reason",
];

/// A partial update.
///
/// `None` leaves the field untouched; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub status: Option<MaintenanceStatus>,
    pub scheduled_start: Option<Option<Timestamp>>,
    pub scheduled_end: Option<Option<Timestamp>>,
    pub started: Option<Option<Timestamp>>,
    pub ended: Option<Option<Timestamp>>,
    pub reason: Option<Option<String>>,
}

impl EventPatch {
    /// Patch that only changes the status.
    pub fn status(status: MaintenanceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Builds a patch from a raw JSON object.
    ///
    /// Any key outside [`ALLOWED_UPDATE_FIELDS`] rejects the whole patch,
    /// which is how attempts to move an event to another application fail.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, MaintenanceError> {
        let disallowed: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| !ALLOWED_UPDATE_FIELDS.contains(key))
            .collect();
        if !disallowed.is_empty() {
            return Err(MaintenanceError::validation(format!(
                "Only updates on these fields are allowed: {}",
                ALLOWED_UPDATE_FIELDS.join(", ")
            )));
        }

        let mut patch = EventPatch::default();
        for (key, value) in fields {
            match key.as_str() {
                "status" => {
                    let raw = value.as_str().ok_or_else(|| {
                        MaintenanceError::validation("status: this field may not be null")
                    })?;
                    patch.status = Some(raw.parse()?);
                }
                "scheduled_start" => patch.scheduled_start = Some(nullable(&key, value)?),
                "scheduled_end" => patch.scheduled_end = Some(nullable(&key, value)?),
                "started" => patch.started = Some(nullable(&key, value)?),
                "ended" => patch.ended = Some(nullable(&key, value)?),
                "reason" => patch.reason = Some(nullable(&key, value)?),
                _ => {}
            }
        }
        Ok(patch)
    }
}

impl NewMaintenanceEvent {
    /// Builds a new event from a raw JSON object.
    ///
    /// Keys outside [`ALLOWED_UPDATE_FIELDS`] are ignored, so an `application`
    /// key in the body can never pick the owner; the caller supplies it.
    /// Values are checked exactly as for updates, and a missing status
    /// defaults to `imminent`.
    pub fn from_fields(mut fields: Map<String, Value>) -> Result<Self, MaintenanceError> {
        fields.retain(|key, _| ALLOWED_UPDATE_FIELDS.contains(&key.as_str()));
        let patch = EventPatch::from_fields(fields)?;
        Ok(Self {
            status: patch.status.unwrap_or_default(),
            scheduled_start: patch.scheduled_start.flatten(),
            scheduled_end: patch.scheduled_end.flatten(),
            started: patch.started.flatten(),
            ended: patch.ended.flatten(),
            reason: patch.reason.flatten(),
        })
    }
}

fn nullable<T: DeserializeOwned>(field: &str, value: Value) -> Result<Option<T>, MaintenanceError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| MaintenanceError::validation(format!("{}: {}", field, e)))
}
