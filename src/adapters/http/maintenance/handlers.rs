//! HTTP handlers for applications and maintenance events.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::application::{ApplicationCatalog, MaintenanceEventStore};
use crate::domain::foundation::{ApplicationId, MaintenanceEventId};
use crate::domain::maintenance::{MaintenanceError, NewMaintenanceEvent};

use super::dto::{
    ApplicationResponse, CreateApplicationRequest, ErrorResponse, HealthResponse,
    MaintenanceEventResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct MaintenanceAppState {
    pub catalog: Arc<ApplicationCatalog>,
    pub events: Arc<MaintenanceEventStore>,
}

impl MaintenanceAppState {
    pub fn new(catalog: Arc<ApplicationCatalog>, events: Arc<MaintenanceEventStore>) -> Self {
        Self { catalog, events }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Applications
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/applications/
pub async fn list_applications(State(state): State<MaintenanceAppState>) -> Response {
    match state.catalog.list().await {
        Ok(apps) => {
            let body: Vec<ApplicationResponse> = apps.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => handle_maintenance_error(e),
    }
}

/// POST /api/applications/
pub async fn create_application(
    State(state): State<MaintenanceAppState>,
    body: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match state.catalog.create(req.into()).await {
        Ok(app) => (StatusCode::CREATED, Json(ApplicationResponse::from(app))).into_response(),
        Err(e) => handle_maintenance_error(e),
    }
}

/// GET /api/applications/:id/
pub async fn get_application(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_application_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.catalog.get(id).await {
        Ok(app) => (StatusCode::OK, Json(ApplicationResponse::from(app))).into_response(),
        Err(e) => handle_maintenance_error(e),
    }
}

/// DELETE /api/applications/:id/
pub async fn delete_application(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_application_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.catalog.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_maintenance_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Maintenance events
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/applications/:id/maintenance-events/
pub async fn list_application_events(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_application_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.events.list_for_application(id).await {
        Ok(events) => events_response(events),
        Err(e) => handle_maintenance_error(e),
    }
}

/// POST /api/applications/:id/maintenance-events/
pub async fn create_event(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let id = match parse_application_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let new_event = match json_body(body).map(NewMaintenanceEvent::from_fields) {
        Ok(Ok(new_event)) => new_event,
        Ok(Err(e)) => return handle_maintenance_error(e),
        Err(response) => return response,
    };

    match state.events.create(id, new_event).await {
        Ok(event) => {
            (StatusCode::CREATED, Json(MaintenanceEventResponse::from(event))).into_response()
        }
        Err(e) => handle_maintenance_error(e),
    }
}

/// GET /api/maintenance-events/
pub async fn list_events(State(state): State<MaintenanceAppState>) -> Response {
    match state.events.list().await {
        Ok(events) => events_response(events),
        Err(e) => handle_maintenance_error(e),
    }
}

/// GET /api/maintenance-events/:id/
pub async fn get_event(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.events.get(id).await {
        Ok(event) => (StatusCode::OK, Json(MaintenanceEventResponse::from(event))).into_response(),
        Err(e) => handle_maintenance_error(e),
    }
}

/// PATCH /api/maintenance-events/:id/
///
/// Only the whitelisted fields may be sent; anything else fails the whole
/// request.
pub async fn update_event(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let fields = match json_body(body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    match state.events.update_fields(id, fields).await {
        Ok(event) => (StatusCode::OK, Json(MaintenanceEventResponse::from(event))).into_response(),
        Err(e) => handle_maintenance_error(e),
    }
}

/// DELETE /api/maintenance-events/:id/
pub async fn delete_event(
    State(state): State<MaintenanceAppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.events.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_maintenance_error(e),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn events_response(events: Vec<crate::domain::maintenance::MaintenanceEvent>) -> Response {
    let body: Vec<MaintenanceEventResponse> = events.into_iter().map(Into::into).collect();
    (StatusCode::OK, Json(body)).into_response()
}

/// Unwraps a JSON body, turning axum's rejection into a 400 `ErrorResponse`.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(rejection.body_text())),
        )
            .into_response()
    })
}

fn parse_application_id(raw: &str) -> Result<ApplicationId, Response> {
    raw.parse::<ApplicationId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid application ID")),
        )
            .into_response()
    })
}

fn parse_event_id(raw: &str) -> Result<MaintenanceEventId, Response> {
    raw.parse::<MaintenanceEventId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid maintenance event ID")),
        )
            .into_response()
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_maintenance_error(error: MaintenanceError) -> Response {
    if error.is_validation() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::rejected(&error)),
        )
            .into_response();
    }

    match error {
        MaintenanceError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(resource, &id)),
        )
            .into_response(),
        other => {
            tracing::error!("Maintenance request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(other.to_string())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_maintenance_error(MaintenanceError::event_not_found(9));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn active_conflict_maps_to_400() {
        let response = handle_maintenance_error(MaintenanceError::active_conflict("perma prod"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_and_duplicate_map_to_400() {
        let response = handle_maintenance_error(MaintenanceError::validation("bad"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = handle_maintenance_error(MaintenanceError::DuplicateApplication {
            slug: "perma".to_string(),
            tier: "prod".to_string(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let response = handle_maintenance_error(MaintenanceError::Infrastructure(
            "connection reset".to_string(),
        ));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert_eq!(
            parse_application_id("abc").unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(parse_event_id("42").unwrap(), MaintenanceEventId::new(42));
    }
}
