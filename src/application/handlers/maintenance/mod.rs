//! Maintenance handlers - application catalog and the event store.

mod application_catalog;
mod event_store;
mod key_lock;

pub use application_catalog::ApplicationCatalog;
pub use event_store::MaintenanceEventStore;
pub use key_lock::ApplicationLocks;
