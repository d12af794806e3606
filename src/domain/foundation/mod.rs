//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that the
//! maintenance domain and its adapters are built on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ApplicationId, MaintenanceEventId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
