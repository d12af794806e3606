//! Request and response DTOs for the maintenance REST surface.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::maintenance::{
    Application, MaintenanceError, MaintenanceEvent, MaintenanceStatus, NewApplication,
};

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationRequest {
    pub slug: String,
    pub tier: String,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(req: CreateApplicationRequest) -> Self {
        NewApplication::new(req.slug, req.tier)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub id: i64,
    pub slug: String,
    pub tier: String,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id.as_i64(),
            slug: app.slug,
            tier: app.tier,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceEventResponse {
    pub id: i64,
    pub application: i64,
    pub status: MaintenanceStatus,
    pub is_active: bool,
    pub scheduled_start: Option<Timestamp>,
    pub scheduled_end: Option<Timestamp>,
    pub started: Option<Timestamp>,
    pub ended: Option<Timestamp>,
    pub reason: Option<String>,
}

impl From<MaintenanceEvent> for MaintenanceEventResponse {
    fn from(event: MaintenanceEvent) -> Self {
        Self {
            id: event.id.as_i64(),
            application: event.application_id.as_i64(),
            is_active: event.is_active(),
            status: event.status,
            scheduled_start: event.scheduled_start,
            scheduled_end: event.scheduled_end,
            started: event.started,
            ended: event.ended,
            reason: event.reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// 400 body carrying the domain error code, e.g. `ACTIVE_EVENT_CONFLICT`.
    pub fn rejected(error: &MaintenanceError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ApplicationId, MaintenanceEventId};

    #[test]
    fn event_response_exposes_application_id_and_activity() {
        let event = MaintenanceEvent {
            id: MaintenanceEventId::new(4),
            application_id: ApplicationId::new(2),
            status: MaintenanceStatus::InProgress,
            scheduled_start: None,
            scheduled_end: None,
            started: None,
            ended: None,
            reason: None,
        };
        let json = serde_json::to_value(MaintenanceEventResponse::from(event)).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["application"], 2);
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn rejected_carries_domain_code() {
        let error = ErrorResponse::rejected(&MaintenanceError::active_conflict("perma prod"));
        assert_eq!(error.code, "ACTIVE_EVENT_CONFLICT");
        assert_eq!(
            error.message,
            "There is already an active maintenance event for perma prod."
        );
    }

    #[test]
    fn error_response_not_found_creates_correctly() {
        let error = ErrorResponse::not_found("MaintenanceEvent", "12");
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.message, "MaintenanceEvent not found: 12");
    }
}
