//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ApplicationRepository` - Application persistence
//! - `MaintenanceEventRepository` - Maintenance event persistence
//! - `StatusBroadcaster` - Post-commit fan-out to WebSocket groups

mod application_repository;
mod maintenance_event_repository;
mod status_broadcaster;

pub use application_repository::ApplicationRepository;
pub use maintenance_event_repository::MaintenanceEventRepository;
pub use status_broadcaster::StatusBroadcaster;
