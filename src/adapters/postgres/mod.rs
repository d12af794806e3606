//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresApplicationRepository` - registered applications
//! - `PostgresMaintenanceEventRepository` - maintenance events, with the
//!   partial unique index as a cross-process guard on active events

mod application_repository;
mod maintenance_event_repository;
mod migrations;

pub use application_repository::PostgresApplicationRepository;
pub use maintenance_event_repository::PostgresMaintenanceEventRepository;
pub use migrations::{connect, run_migrations};
