//! Connection session - the per-client side of the group subscription.
//!
//! ```text
//! Connecting ──join──▶ Joined ──disconnect──▶ Closed
//!      └──────────── unknown route ─────────────┘
//! ```
//!
//! A session is only opened for an application that exists; unknown routes
//! are refused before the upgrade and never join a group.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::application::MaintenanceEventStore;
use crate::domain::foundation::StateMachine;
use crate::domain::maintenance::{Application, GroupKey, MaintenanceError};

use super::dispatcher::BroadcastDispatcher;
use super::messages::GroupMessage;
use super::rooms::{ConnectionHandle, ConnectionId};

/// Lifecycle of one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Joined,
    Closed,
}

impl StateMachine for SessionState {
    fn next_states(&self) -> &'static [Self] {
        match self {
            SessionState::Connecting => &[SessionState::Joined, SessionState::Closed],
            SessionState::Joined => &[SessionState::Closed],
            SessionState::Closed => &[],
        }
    }
}

/// Messages waiting to be written to the socket.
///
/// The snapshot taken at join time always comes out first, ahead of anything
/// dispatched to the group afterwards.
pub struct Outbox {
    initial: Option<GroupMessage>,
    receiver: mpsc::Receiver<GroupMessage>,
}

impl Outbox {
    /// Next message for the client; `None` once the session has left its group.
    pub async fn next(&mut self) -> Option<GroupMessage> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        self.receiver.recv().await
    }
}

/// One client's membership in an application's group.
pub struct ConnectionSession {
    id: ConnectionId,
    application: Application,
    group: GroupKey,
    dispatcher: Arc<BroadcastDispatcher>,
    state: SessionState,
}

impl ConnectionSession {
    /// Joins the application's group and snapshots its current state.
    ///
    /// Both happen under the application's write lock, so the snapshot is
    /// exactly the state preceding the first message the group delivers.
    pub async fn open(
        application: Application,
        events: &MaintenanceEventStore,
        dispatcher: Arc<BroadcastDispatcher>,
        outbound_buffer: usize,
    ) -> Result<(Self, Outbox), MaintenanceError> {
        let id = ConnectionId::new();
        let group = application.group_key();
        let (sender, receiver) = mpsc::channel(outbound_buffer.max(1));

        let rooms = dispatcher.rooms().clone();
        let joined_group = group.clone();
        let handle = ConnectionHandle::new(id, sender);
        let snapshot = events
            .subscribe(application.id, || async move {
                rooms.join(&joined_group, handle).await;
            })
            .await;

        let initial = match snapshot {
            Ok(current) => current.map(|event| GroupMessage::Status(event.status_payload())),
            Err(e) => {
                dispatcher.rooms().leave(&group, id).await;
                tracing::warn!(group = %group, connection_id = %id, "Failed to read current state: {}", e);
                return Err(e);
            }
        };

        let state = SessionState::Connecting.transition_to(SessionState::Joined)?;
        tracing::info!(group = %group, connection_id = %id, "Connection joined {}", application.name());

        let session = Self {
            id,
            application,
            group,
            dispatcher,
            state,
        };
        Ok((session, Outbox { initial, receiver }))
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn group(&self) -> &GroupKey {
        &self.group
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Re-broadcasts a client test message to the whole group.
    ///
    /// Only JSON objects are relayed; anything else is ignored. Returns the
    /// number of members that accepted the message.
    pub async fn relay(&self, text: &str) -> usize {
        if self.state != SessionState::Joined {
            return 0;
        }

        let fields = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                tracing::debug!(connection_id = %self.id, "Ignoring non-object test message");
                return 0;
            }
            Err(e) => {
                tracing::debug!(connection_id = %self.id, "Ignoring malformed test message: {}", e);
                return 0;
            }
        };

        self.dispatcher
            .dispatch(&self.group, GroupMessage::relay(fields))
            .await
    }

    /// Leaves the group. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.dispatcher.rooms().leave(&self.group, self.id).await;
        self.state = SessionState::Closed;
        tracing::info!(group = %self.group, connection_id = %self.id, "Connection left {}", self.application.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMaintenanceStore;
    use crate::adapters::websocket::rooms::RoomManager;
    use crate::domain::foundation::{ApplicationId, DomainError, MaintenanceEventId, Timestamp};
    use crate::domain::maintenance::{
        EventPatch, MaintenanceEvent, MaintenanceStatus, NewApplication, NewMaintenanceEvent,
        StatusPayload,
    };
    use crate::ports::{ApplicationRepository, MaintenanceEventRepository};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Event repository whose next `find_active` parks until released.
    struct ParkedReads {
        inner: Arc<InMemoryMaintenanceStore>,
        armed: AtomicBool,
        parked: Notify,
        release: Notify,
    }

    #[async_trait]
    impl MaintenanceEventRepository for ParkedReads {
        async fn insert(
            &self,
            application_id: ApplicationId,
            event: &NewMaintenanceEvent,
        ) -> Result<MaintenanceEvent, DomainError> {
            MaintenanceEventRepository::insert(self.inner.as_ref(), application_id, event).await
        }

        async fn update(&self, event: &MaintenanceEvent) -> Result<(), DomainError> {
            MaintenanceEventRepository::update(self.inner.as_ref(), event).await
        }

        async fn find_by_id(
            &self,
            id: MaintenanceEventId,
        ) -> Result<Option<MaintenanceEvent>, DomainError> {
            MaintenanceEventRepository::find_by_id(self.inner.as_ref(), id).await
        }

        async fn list(&self) -> Result<Vec<MaintenanceEvent>, DomainError> {
            MaintenanceEventRepository::list(self.inner.as_ref()).await
        }

        async fn list_for_application(
            &self,
            application_id: ApplicationId,
        ) -> Result<Vec<MaintenanceEvent>, DomainError> {
            self.inner.list_for_application(application_id).await
        }

        async fn find_active(
            &self,
            application_id: ApplicationId,
        ) -> Result<Vec<MaintenanceEvent>, DomainError> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.parked.notify_one();
                self.release.notified().await;
            }
            self.inner.find_active(application_id).await
        }

        async fn delete(&self, id: MaintenanceEventId) -> Result<(), DomainError> {
            MaintenanceEventRepository::delete(self.inner.as_ref(), id).await
        }
    }

    fn start_of(year: i32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap())
    }

    struct Fixture {
        rooms: Arc<RoomManager>,
        dispatcher: Arc<BroadcastDispatcher>,
        events: MaintenanceEventStore,
        app: Application,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryMaintenanceStore::new());
        let app = ApplicationRepository::insert(repo.as_ref(), &NewApplication::new("perma", "prod"))
            .await
            .unwrap();
        let rooms = Arc::new(RoomManager::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(rooms.clone()));
        let events = MaintenanceEventStore::new(repo.clone(), repo, dispatcher.clone());
        Fixture {
            rooms,
            dispatcher,
            events,
            app,
        }
    }

    async fn open(f: &Fixture) -> (ConnectionSession, Outbox) {
        ConnectionSession::open(f.app.clone(), &f.events, f.dispatcher.clone(), 8)
            .await
            .unwrap()
    }

    #[test]
    fn session_state_transitions() {
        assert!(SessionState::Connecting.can_transition_to(&SessionState::Joined));
        assert!(SessionState::Connecting.can_transition_to(&SessionState::Closed));
        assert!(!SessionState::Closed.can_transition_to(&SessionState::Joined));
        assert!(SessionState::Joined.transition_to(SessionState::Connecting).is_err());
        assert!(SessionState::Closed.is_terminal());
    }

    #[tokio::test]
    async fn open_joins_group() {
        let f = fixture().await;
        let (session, _outbox) = open(&f).await;

        assert_eq!(session.state(), SessionState::Joined);
        assert_eq!(session.group().as_str(), "maintenance_perma_prod");
        assert_eq!(f.rooms.member_count(session.group()).await, 1);
    }

    #[tokio::test]
    async fn open_sends_active_event_first() {
        let f = fixture().await;
        f.events
            .create(f.app.id, NewMaintenanceEvent::with_status(MaintenanceStatus::InProgress))
            .await
            .unwrap();

        let (_session, mut outbox) = open(&f).await;
        f.events
            .create(f.app.id, NewMaintenanceEvent::with_status(MaintenanceStatus::Completed))
            .await
            .unwrap();

        let first = outbox.next().await.unwrap();
        assert_eq!(
            first,
            GroupMessage::Status(StatusPayload {
                active: true,
                status: Some(MaintenanceStatus::InProgress),
                scheduled_start: None,
                scheduled_end: None,
            })
        );
        let GroupMessage::Status(second) = outbox.next().await.unwrap() else {
            panic!("expected status payload");
        };
        assert_eq!(second.status, Some(MaintenanceStatus::Completed));
    }

    #[tokio::test]
    async fn open_without_active_event_sends_nothing_up_front() {
        let f = fixture().await;
        f.events
            .create(f.app.id, NewMaintenanceEvent::with_status(MaintenanceStatus::Completed))
            .await
            .unwrap();

        let (_session, mut outbox) = open(&f).await;

        let pending = tokio::time::timeout(std::time::Duration::from_millis(20), outbox.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn relay_reaches_every_member_including_sender() {
        let f = fixture().await;
        let (sender, mut sender_outbox) = open(&f).await;
        let (_peer, mut peer_outbox) = open(&f).await;

        let delivered = sender.relay(r#"{"message": "test", "status": "imminent"}"#).await;
        assert_eq!(delivered, 2);

        let expected = json!({
            "message": "test",
            "active": false,
            "status": "imminent",
            "scheduled_start": null,
            "scheduled_end": null,
        });
        for outbox in [&mut sender_outbox, &mut peer_outbox] {
            let message = outbox.next().await.unwrap();
            let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
            assert_eq!(value, expected);
        }
    }

    #[tokio::test]
    async fn relay_ignores_non_objects() {
        let f = fixture().await;
        let (session, _outbox) = open(&f).await;

        assert_eq!(session.relay("not json").await, 0);
        assert_eq!(session.relay("[1, 2, 3]").await, 0);
    }

    #[tokio::test]
    async fn close_leaves_group_and_is_idempotent() {
        let f = fixture().await;
        let (mut session, mut outbox) = open(&f).await;

        session.close().await;
        session.close().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(f.rooms.member_count(session.group()).await, 0);
        assert_eq!(session.relay(r#"{"a": 1}"#).await, 0);
        assert!(outbox.next().await.is_none());
    }

    #[tokio::test]
    async fn snapshot_precedes_changes_committed_while_opening() {
        let inner = Arc::new(InMemoryMaintenanceStore::new());
        let app = ApplicationRepository::insert(inner.as_ref(), &NewApplication::new("perma", "prod"))
            .await
            .unwrap();
        let parked = Arc::new(ParkedReads {
            inner: inner.clone(),
            armed: AtomicBool::new(false),
            parked: Notify::new(),
            release: Notify::new(),
        });
        let dispatcher = Arc::new(BroadcastDispatcher::new(Arc::new(RoomManager::new())));
        let events = Arc::new(MaintenanceEventStore::new(
            inner,
            parked.clone(),
            dispatcher.clone(),
        ));
        let id = events.create(app.id, NewMaintenanceEvent::default()).await.unwrap().id;

        parked.armed.store(true, Ordering::SeqCst);
        let opening = {
            let events = events.clone();
            let dispatcher = dispatcher.clone();
            let app = app.clone();
            tokio::spawn(async move { ConnectionSession::open(app, &events, dispatcher, 8).await })
        };
        parked.parked.notified().await;

        let mut writers = Vec::new();
        for year in [2024, 2025] {
            let events = events.clone();
            let patch = EventPatch {
                scheduled_start: Some(Some(start_of(year))),
                ..Default::default()
            };
            writers.push(tokio::spawn(async move { events.update(id, patch).await }));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        parked.release.notify_one();
        let (_session, mut outbox) = opening.await.unwrap().unwrap();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let mut starts = Vec::new();
        for _ in 0..3 {
            let GroupMessage::Status(payload) = outbox.next().await.unwrap() else {
                panic!("expected status payload");
            };
            starts.push(payload.scheduled_start);
        }
        assert_eq!(
            starts,
            vec![
                None,
                Some(start_of(2024).to_display_string()),
                Some(start_of(2025).to_display_string()),
            ]
        );
    }
}
