//! Group registry for maintenance subscribers.
//!
//! Groups are keyed by [`GroupKey`] (`maintenance_{slug}_{tier}`), allowing a
//! status change to reach every client watching one application.
//!
//! # Architecture
//!
//! ```text
//! Group: maintenance_perma_prod    Group: maintenance_h2o_stage
//! ├── conn-a                       ├── conn-d
//! ├── conn-b                       └── conn-e
//! └── conn-c
//! ```
//!
//! When perma/prod changes, only connections a, b, c receive it.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::domain::maintenance::GroupKey;

use super::dispatcher::DeliveryError;
use super::messages::GroupMessage;

/// Unique identifier for a WebSocket connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of one connection's outbound queue.
///
/// Cheap to clone; the dispatcher works on cloned snapshots so that no
/// registry lock is held while delivering.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<GroupMessage>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<GroupMessage>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues `message` without waiting.
    pub fn try_deliver(&self, message: GroupMessage) -> Result<(), DeliveryError> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull(self.id),
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(self.id),
        })
    }
}

type Members = HashMap<ConnectionId, ConnectionHandle>;

/// Manages group membership of live connections.
///
/// # Thread Safety
///
/// Uses `RwLock` since lookups (one per broadcast) vastly outnumber
/// joins/leaves.
#[derive(Default)]
pub struct RoomManager {
    groups: RwLock<HashMap<GroupKey, Members>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a group.
    ///
    /// Joining twice leaves a single membership; the latest handle wins.
    pub async fn join(&self, group: &GroupKey, handle: ConnectionHandle) {
        let mut groups = self.groups.write().await;
        let id = handle.id();

        groups.entry(group.clone()).or_default().insert(id, handle);

        tracing::debug!(group = %group, connection_id = %id, "Connection joined group");
    }

    /// Removes a connection from one group. Leaving a group the connection
    /// is not in is a no-op.
    ///
    /// Empty groups are cleaned up.
    pub async fn leave(&self, group: &GroupKey, id: ConnectionId) {
        let mut groups = self.groups.write().await;

        let removed = match groups.get_mut(group) {
            Some(members) => {
                let removed = members.remove(&id).is_some();
                if members.is_empty() {
                    groups.remove(group);
                }
                removed
            }
            None => false,
        };

        if removed {
            tracing::debug!(group = %group, connection_id = %id, "Connection left group");
        }
    }

    /// Snapshot of the group's members at the instant of the call.
    pub async fn members_of(&self, group: &GroupKey) -> Vec<ConnectionHandle> {
        self.groups
            .read()
            .await
            .get(group)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of connections in a group (0 if the group doesn't exist).
    pub async fn member_count(&self, group: &GroupKey) -> usize {
        self.groups
            .read()
            .await
            .get(group)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}
