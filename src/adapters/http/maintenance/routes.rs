//! Route configuration for maintenance endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{
    create_application, create_event, delete_application, delete_event, get_application,
    get_event, health, list_application_events, list_applications, list_events, update_event,
    MaintenanceAppState,
};

/// Creates the maintenance router with all endpoints.
///
/// Routes:
/// - `GET|POST /api/applications/`
/// - `GET|DELETE /api/applications/:id/`
/// - `GET|POST /api/applications/:id/maintenance-events/`
/// - `GET /api/maintenance-events/`
/// - `GET|PATCH|DELETE /api/maintenance-events/:id/`
/// - `GET /health`
pub fn maintenance_router() -> Router<MaintenanceAppState> {
    Router::new()
        .route(
            "/api/applications/",
            get(list_applications).post(create_application),
        )
        .route(
            "/api/applications/:id/",
            get(get_application).delete(delete_application),
        )
        .route(
            "/api/applications/:id/maintenance-events/",
            get(list_application_events).post(create_event),
        )
        .route("/api/maintenance-events/", get(list_events))
        .route(
            "/api/maintenance-events/:id/",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/health", get(health))
}
