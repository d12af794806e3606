//! StatusBroadcaster port - post-commit hook from the event store to the
//! real-time layer.
//!
//! The event store calls this after every committed change. Publishing is
//! best-effort: it cannot fail, and a slow or dead subscriber must not delay
//! the caller.

use async_trait::async_trait;

use crate::domain::maintenance::{GroupKey, StatusPayload};

/// Port for fanning a status payload out to one group.
#[async_trait]
pub trait StatusBroadcaster: Send + Sync {
    /// Deliver `payload` to every connection currently in `group`.
    async fn publish(&self, group: &GroupKey, payload: StatusPayload);
}
