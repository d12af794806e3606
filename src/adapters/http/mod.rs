//! HTTP adapters - REST API implementations.

mod cors;
pub mod maintenance;

pub use cors::build_cors_layer;
pub use maintenance::{maintenance_router, MaintenanceAppState};

use axum::Router;

use super::websocket::{websocket_router, WebSocketState};

/// REST endpoints, health check and the WebSocket route in one router.
pub fn app_router(maintenance: MaintenanceAppState, websocket: WebSocketState) -> Router {
    maintenance_router()
        .with_state(maintenance)
        .merge(websocket_router().with_state(websocket))
}
