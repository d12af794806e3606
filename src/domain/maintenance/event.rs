//! Maintenance events and the status payload pushed to subscribers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ApplicationId, MaintenanceEventId, Timestamp};

use super::patch::EventPatch;
use super::status::MaintenanceStatus;

/// A scheduled or in-progress maintenance window for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub id: MaintenanceEventId,
    pub application_id: ApplicationId,
    pub status: MaintenanceStatus,
    pub scheduled_start: Option<Timestamp>,
    pub scheduled_end: Option<Timestamp>,
    pub started: Option<Timestamp>,
    pub ended: Option<Timestamp>,
    pub reason: Option<String>,
}

impl MaintenanceEvent {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Projects the state this event would have after `patch` is applied.
    ///
    /// The owning application never changes.
    pub fn apply(&self, patch: &EventPatch) -> MaintenanceEvent {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(value) = patch.scheduled_start {
            next.scheduled_start = value;
        }
        if let Some(value) = patch.scheduled_end {
            next.scheduled_end = value;
        }
        if let Some(value) = patch.started {
            next.started = value;
        }
        if let Some(value) = patch.ended {
            next.ended = value;
        }
        if let Some(value) = &patch.reason {
            next.reason = value.clone();
        }
        next
    }

    /// Current-state payload broadcast to the application's group.
    pub fn status_payload(&self) -> StatusPayload {
        StatusPayload {
            active: self.is_active(),
            status: Some(self.status),
            scheduled_start: self.scheduled_start.map(|ts| ts.to_display_string()),
            scheduled_end: self.scheduled_end.map(|ts| ts.to_display_string()),
        }
    }
}

impl fmt::Display for MaintenanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaintenanceEvent {}: {}", self.id, self.status)
    }
}

/// Input for creating a maintenance event.
///
/// The owning application is supplied by the caller (the route), never by
/// the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMaintenanceEvent {
    pub status: MaintenanceStatus,
    pub scheduled_start: Option<Timestamp>,
    pub scheduled_end: Option<Timestamp>,
    pub started: Option<Timestamp>,
    pub ended: Option<Timestamp>,
    pub reason: Option<String>,
}

impl NewMaintenanceEvent {
    pub fn with_status(status: MaintenanceStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

/// JSON object pushed to WebSocket subscribers.
///
/// Schedule fields are pre-formatted `"%c %Z"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub active: bool,
    pub status: Option<MaintenanceStatus>,
    pub scheduled_start: Option<String>,
    pub scheduled_end: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn event(status: MaintenanceStatus) -> MaintenanceEvent {
        MaintenanceEvent {
            id: MaintenanceEventId::new(1),
            application_id: ApplicationId::new(1),
            status,
            scheduled_start: None,
            scheduled_end: None,
            started: None,
            ended: None,
            reason: None,
        }
    }

    #[test]
    fn payload_for_active_event_without_schedule() {
        let payload = event(MaintenanceStatus::Imminent).status_payload();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "active": true,
                "status": "imminent",
                "scheduled_start": null,
                "scheduled_end": null,
            })
        );
    }

    #[test]
    fn payload_formats_schedule_fields() {
        let mut e = event(MaintenanceStatus::Completed);
        e.scheduled_start = Some(Utc.with_ymd_and_hms(2024, 7, 8, 0, 30, 0).unwrap().into());

        let payload = e.status_payload();
        assert!(!payload.active);
        assert_eq!(
            payload.scheduled_start.as_deref(),
            Some("Mon Jul  8 00:30:00 2024 UTC")
        );
        assert_eq!(payload.scheduled_end, None);
    }

    #[test]
    fn apply_only_touches_patched_fields() {
        let mut original = event(MaintenanceStatus::Imminent);
        original.reason = Some("kernel upgrade".to_string());

        let patch = EventPatch {
            status: Some(MaintenanceStatus::InProgress),
            started: Some(Some(Timestamp::now())),
            ..Default::default()
        };
        let next = original.apply(&patch);

        assert_eq!(next.status, MaintenanceStatus::InProgress);
        assert!(next.started.is_some());
        assert_eq!(next.reason.as_deref(), Some("kernel upgrade"));
        assert_eq!(next.application_id, original.application_id);
    }

    #[test]
    fn apply_can_clear_optional_fields() {
        let mut original = event(MaintenanceStatus::Imminent);
        original.reason = Some("db failover".to_string());

        let patch = EventPatch {
            reason: Some(None),
            ..Default::default()
        };
        assert_eq!(original.apply(&patch).reason, None);
    }

    #[test]
    fn new_event_defaults_to_imminent() {
        assert_eq!(NewMaintenanceEvent::default().status, MaintenanceStatus::Imminent);
    }
}
