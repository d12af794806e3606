//! ApplicationCatalog - registration and lookup of applications.

use std::sync::Arc;

use crate::domain::foundation::ApplicationId;
use crate::domain::maintenance::{Application, MaintenanceError, NewApplication};
use crate::ports::ApplicationRepository;

use super::event_store::MaintenanceEventStore;

/// Handler for the application side of the REST surface.
///
/// Deletion goes through the event store so that an active event is
/// canceled and broadcast before the cascade removes it.
pub struct ApplicationCatalog {
    applications: Arc<dyn ApplicationRepository>,
    events: Arc<MaintenanceEventStore>,
}

impl ApplicationCatalog {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        events: Arc<MaintenanceEventStore>,
    ) -> Self {
        Self {
            applications,
            events,
        }
    }

    pub async fn create(&self, new_application: NewApplication) -> Result<Application, MaintenanceError> {
        new_application.validate()?;

        if self
            .applications
            .find_by_slug_and_tier(&new_application.slug, &new_application.tier)
            .await?
            .is_some()
        {
            return Err(MaintenanceError::DuplicateApplication {
                slug: new_application.slug,
                tier: new_application.tier,
            });
        }

        let application = self.applications.insert(&new_application).await?;
        tracing::info!(application_id = %application.id, application = %application.name(), "Registered application");
        Ok(application)
    }

    pub async fn get(&self, id: ApplicationId) -> Result<Application, MaintenanceError> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or_else(|| MaintenanceError::application_not_found(id))
    }

    pub async fn list(&self) -> Result<Vec<Application>, MaintenanceError> {
        Ok(self.applications.list().await?)
    }

    /// Resolves the application a WebSocket route points at.
    pub async fn find_by_route(&self, slug: &str, tier: &str) -> Result<Application, MaintenanceError> {
        self.applications
            .find_by_slug_and_tier(slug, tier)
            .await?
            .ok_or_else(|| MaintenanceError::application_not_found(format!("{} {}", slug, tier)))
    }

    pub async fn delete(&self, id: ApplicationId) -> Result<(), MaintenanceError> {
        self.events.delete_application(id).await
    }
}
