//! Broadcast dispatcher - fans messages out to every member of a group.
//!
//! Delivery is fire-and-forget per connection: each member has a bounded
//! outbound queue and the dispatcher only ever calls `try_send` on it. A full
//! queue drops the message for that member, a closed queue removes the member
//! from the group. Neither affects the other members or the caller.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::maintenance::{GroupKey, StatusPayload};
use crate::ports::StatusBroadcaster;

use super::messages::GroupMessage;
use super::rooms::{ConnectionId, RoomManager};

/// Failure to hand a message to one connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound queue full for connection {0}")]
    QueueFull(ConnectionId),

    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}

/// Delivers group messages through the [`RoomManager`].
///
/// Constructed once at start-up and shared by the event store (as its
/// [`StatusBroadcaster`]) and by every connection session.
pub struct BroadcastDispatcher {
    rooms: Arc<RoomManager>,
}

impl BroadcastDispatcher {
    pub fn new(rooms: Arc<RoomManager>) -> Self {
        Self { rooms }
    }

    pub fn rooms(&self) -> &Arc<RoomManager> {
        &self.rooms
    }

    /// Sends `message` to the members of `group` at the instant of the call.
    ///
    /// Returns how many members accepted it.
    pub async fn dispatch(&self, group: &GroupKey, message: GroupMessage) -> usize {
        let members = self.rooms.members_of(group).await;
        let total = members.len();
        let mut delivered = 0;

        for member in members {
            match member.try_deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e @ DeliveryError::QueueFull(_)) => {
                    tracing::warn!(group = %group, "Dropped message: {}", e);
                }
                Err(e @ DeliveryError::Closed(_)) => {
                    tracing::debug!(group = %group, "Pruning member: {}", e);
                    self.rooms.leave(group, member.id()).await;
                }
            }
        }

        tracing::debug!(group = %group, delivered, total, "Dispatched group message");
        delivered
    }
}

#[async_trait]
impl StatusBroadcaster for BroadcastDispatcher {
    async fn publish(&self, group: &GroupKey, payload: StatusPayload) {
        self.dispatch(group, GroupMessage::Status(payload)).await;
    }
}
