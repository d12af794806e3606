//! Application layer - handlers that coordinate domain rules with ports.
//!
//! The maintenance handlers own the write path: they hold the per-application
//! lock, run the active-event check, persist, and only then broadcast.

pub mod handlers;

pub use handlers::{ApplicationCatalog, ApplicationLocks, MaintenanceEventStore};
