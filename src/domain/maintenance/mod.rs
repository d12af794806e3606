//! Maintenance module - applications, maintenance events and the
//! single-active-event rule.
//!
//! At most one event per application may be active (`imminent` or
//! `in_progress`) at any time. [`check_active_invariant`] is the pure check;
//! the event store applies it under a per-application lock.

mod application;
mod errors;
mod event;
mod patch;
mod status;
mod validation;

pub use application::{Application, GroupKey, NewApplication};
pub use errors::MaintenanceError;
pub use event::{MaintenanceEvent, NewMaintenanceEvent, StatusPayload};
pub use patch::{EventPatch, ALLOWED_UPDATE_FIELDS};
pub use status::{MaintenanceStatus, ACTIVE_STATUSES};
pub use validation::check_active_invariant;
