//! MaintenanceEventStore - the only write path for maintenance events.
//!
//! Every write runs under the owning application's lock:
//!
//! 1. read the application's active events
//! 2. check the single-active-event rule against the projected state
//! 3. commit
//! 4. publish the new state to the application's group
//!
//! A write that fails at any step publishes nothing.

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::foundation::{ApplicationId, MaintenanceEventId};
use crate::domain::maintenance::{
    check_active_invariant, Application, EventPatch, MaintenanceError, MaintenanceEvent,
    MaintenanceStatus, NewMaintenanceEvent,
};
use crate::ports::{ApplicationRepository, MaintenanceEventRepository, StatusBroadcaster};

use super::key_lock::ApplicationLocks;

/// Validated persistence and notification of maintenance events.
pub struct MaintenanceEventStore {
    applications: Arc<dyn ApplicationRepository>,
    events: Arc<dyn MaintenanceEventRepository>,
    broadcaster: Arc<dyn StatusBroadcaster>,
    locks: ApplicationLocks,
}

impl MaintenanceEventStore {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        events: Arc<dyn MaintenanceEventRepository>,
        broadcaster: Arc<dyn StatusBroadcaster>,
    ) -> Self {
        Self {
            applications,
            events,
            broadcaster,
            locks: ApplicationLocks::new(),
        }
    }

    /// Creates an event for `application_id`.
    ///
    /// Fails with [`MaintenanceError::ActiveConflict`] when the new event is
    /// active and another active event exists.
    pub async fn create(
        &self,
        application_id: ApplicationId,
        new_event: NewMaintenanceEvent,
    ) -> Result<MaintenanceEvent, MaintenanceError> {
        let application = self.load_application(application_id).await?;
        let _guard = self.locks.lock(application_id).await;

        let active = self.active_ids(application_id).await?;
        check_active_invariant(&application, &active, None, Some(new_event.status))?;

        let event = self.events.insert(application_id, &new_event).await?;
        tracing::info!(event_id = %event.id, application = %application.name(), "Created maintenance event");

        self.notify(&application, &event).await;
        Ok(event)
    }

    /// Applies a raw JSON update restricted to the whitelisted fields.
    pub async fn update_fields(
        &self,
        id: MaintenanceEventId,
        fields: Map<String, Value>,
    ) -> Result<MaintenanceEvent, MaintenanceError> {
        let patch = EventPatch::from_fields(fields)?;
        self.update(id, patch).await
    }

    /// Applies `patch` to the event and broadcasts its new state.
    ///
    /// An empty patch still counts as a save and is broadcast.
    pub async fn update(
        &self,
        id: MaintenanceEventId,
        patch: EventPatch,
    ) -> Result<MaintenanceEvent, MaintenanceError> {
        let event = self.get(id).await?;
        let application = self.load_application(event.application_id).await?;
        let _guard = self.locks.lock(application.id).await;

        // Re-read under the lock; another writer may have changed or deleted it.
        let current = self.get(id).await?;
        self.update_locked(&application, &current, &patch).await
    }

    /// Deletes an event.
    ///
    /// An active event is first moved to `canceled` and that change is
    /// broadcast, so subscribers never keep showing a deleted maintenance.
    pub async fn delete(&self, id: MaintenanceEventId) -> Result<(), MaintenanceError> {
        let event = self.get(id).await?;
        let application = self.load_application(event.application_id).await?;
        let _guard = self.locks.lock(application.id).await;

        let current = self.get(id).await?;
        tracing::info!("Pending deletion of {}", current);

        if current.is_active() {
            self.update_locked(
                &application,
                &current,
                &EventPatch::status(MaintenanceStatus::Canceled),
            )
            .await?;
        }

        self.events.delete(id).await?;
        tracing::info!(event_id = %id, application = %application.name(), "Deleted maintenance event");
        Ok(())
    }

    /// Deletes an application together with its events.
    ///
    /// Active events are canceled and broadcast first, like [`Self::delete`].
    pub async fn delete_application(&self, id: ApplicationId) -> Result<(), MaintenanceError> {
        let application = self.load_application(id).await?;
        {
            let _guard = self.locks.lock(id).await;

            for event in self.events.find_active(id).await? {
                self.update_locked(
                    &application,
                    &event,
                    &EventPatch::status(MaintenanceStatus::Canceled),
                )
                .await?;
            }

            self.applications.delete(id).await?;
        }
        self.locks.forget(id);

        tracing::info!(application = %application.name(), "Deleted application");
        Ok(())
    }

    pub async fn get(&self, id: MaintenanceEventId) -> Result<MaintenanceEvent, MaintenanceError> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| MaintenanceError::event_not_found(id))
    }

    pub async fn list(&self) -> Result<Vec<MaintenanceEvent>, MaintenanceError> {
        Ok(self.events.list().await?)
    }

    pub async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, MaintenanceError> {
        self.load_application(application_id).await?;
        Ok(self.events.list_for_application(application_id).await?)
    }

    /// The application's active event, if any.
    ///
    /// When several are active (a pre-existing breach) the first one in id
    /// order is returned.
    pub async fn current_event(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<MaintenanceEvent>, MaintenanceError> {
        let mut active = self.events.find_active(application_id).await?;
        active.sort_by_key(|e| e.id);
        Ok(active.into_iter().next())
    }

    /// Runs `join` and reads the current event under the application's
    /// write lock.
    ///
    /// No write can commit between the two, so a subscriber registered by
    /// `join` receives exactly the changes made after the returned snapshot.
    pub async fn subscribe<F, Fut>(
        &self,
        application_id: ApplicationId,
        join: F,
    ) -> Result<Option<MaintenanceEvent>, MaintenanceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let _guard = self.locks.lock(application_id).await;
        join().await;
        self.current_event(application_id).await
    }

    async fn update_locked(
        &self,
        application: &Application,
        current: &MaintenanceEvent,
        patch: &EventPatch,
    ) -> Result<MaintenanceEvent, MaintenanceError> {
        let next = current.apply(patch);

        let active = self.active_ids(application.id).await?;
        check_active_invariant(application, &active, Some(next.id), Some(next.status))?;

        self.events.update(&next).await?;
        tracing::info!(event_id = %next.id, status = %next.status, "Updated maintenance event");

        self.notify(application, &next).await;
        Ok(next)
    }

    async fn notify(&self, application: &Application, event: &MaintenanceEvent) {
        tracing::info!("Notifying {} about {}", application.name(), event);
        self.broadcaster
            .publish(&application.group_key(), event.status_payload())
            .await;
        tracing::info!("Notified {} about {}", application.name(), event);
    }

    async fn active_ids(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEventId>, MaintenanceError> {
        Ok(self
            .events
            .find_active(application_id)
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect())
    }

    async fn load_application(&self, id: ApplicationId) -> Result<Application, MaintenanceError> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or_else(|| MaintenanceError::application_not_found(id))
    }
}
