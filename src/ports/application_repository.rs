//! Application repository port.
//!
//! Defines the contract for registering and looking up applications.
//!
//! # Design
//!
//! - **Uniqueness**: `(slug, tier)` must be enforced by the implementation at
//!   insert time, failing with `ErrorCode::Conflict` and `slug`/`tier` details
//! - **Cascade**: deleting an application removes its maintenance events

use crate::domain::foundation::{ApplicationId, DomainError};
use crate::domain::maintenance::{Application, NewApplication};
use async_trait::async_trait;

/// Repository port for application persistence.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new application and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `(slug, tier)` is already registered
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, application: &NewApplication) -> Result<Application, DomainError>;

    /// Find an application by its ID.
    async fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, DomainError>;

    /// Find the application a WebSocket route points at.
    async fn find_by_slug_and_tier(
        &self,
        slug: &str,
        tier: &str,
    ) -> Result<Option<Application>, DomainError>;

    /// List all applications ordered by id.
    async fn list(&self) -> Result<Vec<Application>, DomainError>;

    /// Delete an application and, by cascade, its events.
    ///
    /// # Errors
    ///
    /// - `ApplicationNotFound` if the application doesn't exist
    async fn delete(&self, id: ApplicationId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ApplicationRepository) {}
    }
}
