//! In-process adapters for the repository ports.
//!
//! Used by the test suite and by the server when no database URL is
//! configured.

mod maintenance_store;

pub use maintenance_store::InMemoryMaintenanceStore;
