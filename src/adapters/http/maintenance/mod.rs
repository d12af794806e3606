//! HTTP adapter for application and maintenance event endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ApplicationResponse, CreateApplicationRequest, ErrorResponse, HealthResponse,
    MaintenanceEventResponse,
};
pub use handlers::MaintenanceAppState;
pub use routes::maintenance_router;
