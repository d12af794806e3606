//! In-memory implementation of both repository ports.
//!
//! A single store backs applications and events so that deleting an
//! application can cascade to its events. Locks are never held across an
//! await point.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{ApplicationId, DomainError, ErrorCode, MaintenanceEventId};
use crate::domain::maintenance::{
    Application, MaintenanceEvent, NewApplication, NewMaintenanceEvent,
};
use crate::ports::{ApplicationRepository, MaintenanceEventRepository};

#[derive(Default)]
struct State {
    applications: BTreeMap<ApplicationId, Application>,
    events: BTreeMap<MaintenanceEventId, MaintenanceEvent>,
    last_application_id: i64,
    last_event_id: i64,
}

/// In-memory application and maintenance event store.
///
/// Does not enforce the single-active-event rule itself; that is the event
/// store's job. Tests rely on this to seed a store that already breaks it.
#[derive(Default)]
pub struct InMemoryMaintenanceStore {
    state: RwLock<State>,
}

impl InMemoryMaintenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DomainError> {
        self.state
            .read()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "maintenance store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DomainError> {
        self.state
            .write()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "maintenance store lock poisoned"))
    }
}

fn application_not_found(id: ApplicationId) -> DomainError {
    DomainError::new(
        ErrorCode::ApplicationNotFound,
        format!("Application not found: {}", id),
    )
    .with_detail("id", id.to_string())
}

fn event_not_found(id: MaintenanceEventId) -> DomainError {
    DomainError::new(
        ErrorCode::MaintenanceEventNotFound,
        format!("Maintenance event not found: {}", id),
    )
    .with_detail("id", id.to_string())
}

#[async_trait]
impl ApplicationRepository for InMemoryMaintenanceStore {
    async fn insert(&self, application: &NewApplication) -> Result<Application, DomainError> {
        let mut state = self.write()?;
        let duplicate = state
            .applications
            .values()
            .any(|a| a.slug == application.slug && a.tier == application.tier);
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!(
                    "Application already exists: {} {}",
                    application.slug, application.tier
                ),
            )
            .with_detail("slug", application.slug.clone())
            .with_detail("tier", application.tier.clone()));
        }

        state.last_application_id += 1;
        let created = Application {
            id: ApplicationId::new(state.last_application_id),
            slug: application.slug.clone(),
            tier: application.tier.clone(),
        };
        state.applications.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, DomainError> {
        Ok(self.read()?.applications.get(&id).cloned())
    }

    async fn find_by_slug_and_tier(
        &self,
        slug: &str,
        tier: &str,
    ) -> Result<Option<Application>, DomainError> {
        Ok(self
            .read()?
            .applications
            .values()
            .find(|a| a.slug == slug && a.tier == tier)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Application>, DomainError> {
        Ok(self.read()?.applications.values().cloned().collect())
    }

    async fn delete(&self, id: ApplicationId) -> Result<(), DomainError> {
        let mut state = self.write()?;
        if state.applications.remove(&id).is_none() {
            return Err(application_not_found(id));
        }
        state.events.retain(|_, e| e.application_id != id);
        Ok(())
    }
}

#[async_trait]
impl MaintenanceEventRepository for InMemoryMaintenanceStore {
    async fn insert(
        &self,
        application_id: ApplicationId,
        event: &NewMaintenanceEvent,
    ) -> Result<MaintenanceEvent, DomainError> {
        let mut state = self.write()?;
        if !state.applications.contains_key(&application_id) {
            return Err(application_not_found(application_id));
        }

        state.last_event_id += 1;
        let created = MaintenanceEvent {
            id: MaintenanceEventId::new(state.last_event_id),
            application_id,
            status: event.status,
            scheduled_start: event.scheduled_start,
            scheduled_end: event.scheduled_end,
            started: event.started,
            ended: event.ended,
            reason: event.reason.clone(),
        };
        state.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, event: &MaintenanceEvent) -> Result<(), DomainError> {
        let mut state = self.write()?;
        let stored = state
            .events
            .get_mut(&event.id)
            .ok_or_else(|| event_not_found(event.id))?;
        let application_id = stored.application_id;
        *stored = MaintenanceEvent {
            application_id,
            ..event.clone()
        };
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: MaintenanceEventId,
    ) -> Result<Option<MaintenanceEvent>, DomainError> {
        Ok(self.read()?.events.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<MaintenanceEvent>, DomainError> {
        Ok(self.read()?.events.values().cloned().collect())
    }

    async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, DomainError> {
        Ok(self
            .read()?
            .events
            .values()
            .filter(|e| e.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn find_active(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, DomainError> {
        Ok(self
            .read()?
            .events
            .values()
            .filter(|e| e.application_id == application_id && e.is_active())
            .cloned()
            .collect())
    }

    async fn delete(&self, id: MaintenanceEventId) -> Result<(), DomainError> {
        self.write()?
            .events
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| event_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::maintenance::MaintenanceStatus;

    async fn seeded() -> (InMemoryMaintenanceStore, Application) {
        let store = InMemoryMaintenanceStore::new();
        let app = ApplicationRepository::insert(&store, &NewApplication::new("perma", "prod"))
            .await
            .unwrap();
        (store, app)
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let (store, first) = seeded().await;
        let second = ApplicationRepository::insert(&store, &NewApplication::new("perma", "stage"))
            .await
            .unwrap();
        assert_eq!(first.id.as_i64(), 1);
        assert_eq!(second.id.as_i64(), 2);
    }

    #[tokio::test]
    async fn duplicate_slug_and_tier_is_a_conflict() {
        let (store, _) = seeded().await;
        let err = ApplicationRepository::insert(&store, &NewApplication::new("perma", "prod"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.detail("slug"), Some("perma"));
    }

    #[tokio::test]
    async fn finds_application_by_route() {
        let (store, app) = seeded().await;
        let found = store.find_by_slug_and_tier("perma", "prod").await.unwrap();
        assert_eq!(found, Some(app));
        assert!(store.find_by_slug_and_tier("perma", "dev").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_active_filters_by_application_and_status() {
        let (store, app) = seeded().await;
        let other = ApplicationRepository::insert(&store, &NewApplication::new("h2o", "prod"))
            .await
            .unwrap();

        let active = MaintenanceEventRepository::insert(&store, app.id, &NewMaintenanceEvent::default())
            .await
            .unwrap();
        MaintenanceEventRepository::insert(
            &store,
            app.id,
            &NewMaintenanceEvent::with_status(MaintenanceStatus::Completed),
        )
        .await
        .unwrap();
        MaintenanceEventRepository::insert(&store, other.id, &NewMaintenanceEvent::default())
            .await
            .unwrap();

        assert_eq!(store.find_active(app.id).await.unwrap(), vec![active]);
        assert_eq!(store.list_for_application(app.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_never_moves_event_to_another_application() {
        let (store, app) = seeded().await;
        let mut event = MaintenanceEventRepository::insert(&store, app.id, &NewMaintenanceEvent::default())
            .await
            .unwrap();

        event.application_id = ApplicationId::new(99);
        event.status = MaintenanceStatus::Completed;
        store.update(&event).await.unwrap();

        let stored = MaintenanceEventRepository::find_by_id(&store, event.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.application_id, app.id);
        assert_eq!(stored.status, MaintenanceStatus::Completed);
    }

    #[tokio::test]
    async fn insert_event_for_missing_application_fails() {
        let store = InMemoryMaintenanceStore::new();
        let err = MaintenanceEventRepository::insert(
            &store,
            ApplicationId::new(5),
            &NewMaintenanceEvent::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApplicationNotFound);
    }

    #[tokio::test]
    async fn deleting_application_cascades_to_events() {
        let (store, app) = seeded().await;
        let event = MaintenanceEventRepository::insert(&store, app.id, &NewMaintenanceEvent::default())
            .await
            .unwrap();

        ApplicationRepository::delete(&store, app.id).await.unwrap();

        assert!(MaintenanceEventRepository::find_by_id(&store, event.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            ApplicationRepository::delete(&store, app.id).await.unwrap_err().code,
            ErrorCode::ApplicationNotFound
        );
    }
}
