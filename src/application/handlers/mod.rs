//! Application handlers.

pub mod maintenance;

pub use maintenance::{ApplicationCatalog, ApplicationLocks, MaintenanceEventStore};
