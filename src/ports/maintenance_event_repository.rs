//! Maintenance event repository port.
//!
//! Defines the contract for persisting maintenance events. Implementations
//! store what they are given; the single-active-event rule is checked by the
//! event store before any write reaches this port.
//!
//! Implementations backed by a shared database should additionally reject a
//! second active event per application (e.g. a partial unique index) and
//! report it as `ErrorCode::ActiveEventConflict` with an `application` detail.

use crate::domain::foundation::{ApplicationId, DomainError, MaintenanceEventId};
use crate::domain::maintenance::{MaintenanceEvent, NewMaintenanceEvent};
use async_trait::async_trait;

/// Repository port for maintenance event persistence.
#[async_trait]
pub trait MaintenanceEventRepository: Send + Sync {
    /// Insert a new event for `application_id`.
    ///
    /// # Errors
    ///
    /// - `ApplicationNotFound` if the application doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn insert(
        &self,
        application_id: ApplicationId,
        event: &NewMaintenanceEvent,
    ) -> Result<MaintenanceEvent, DomainError>;

    /// Overwrite the mutable fields of an existing event.
    ///
    /// The owning application is never changed.
    ///
    /// # Errors
    ///
    /// - `MaintenanceEventNotFound` if the event doesn't exist
    async fn update(&self, event: &MaintenanceEvent) -> Result<(), DomainError>;

    /// Find an event by its ID.
    async fn find_by_id(
        &self,
        id: MaintenanceEventId,
    ) -> Result<Option<MaintenanceEvent>, DomainError>;

    /// All events ordered by id.
    async fn list(&self) -> Result<Vec<MaintenanceEvent>, DomainError>;

    /// Events belonging to one application, ordered by id.
    async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, DomainError>;

    /// Events of one application whose status is active, ordered by id.
    async fn find_active(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, DomainError>;

    /// Remove an event.
    ///
    /// # Errors
    ///
    /// - `MaintenanceEventNotFound` if the event doesn't exist
    async fn delete(&self, id: MaintenanceEventId) -> Result<(), DomainError>;
}
