//! Per-application write locks.
//!
//! Writes for the same application are serialized so that the read of the
//! active events, the validation, the commit and the broadcast happen as one
//! unit. Writes for different applications never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::ApplicationId;

/// Registry of one async mutex per application.
#[derive(Default)]
pub struct ApplicationLocks {
    locks: Mutex<HashMap<ApplicationId, Arc<AsyncMutex<()>>>>,
}

impl ApplicationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `application_id`.
    ///
    /// The guard releases the lock when dropped.
    pub async fn lock(&self, application_id: ApplicationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(application_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry of a deleted application.
    ///
    /// Holders of an outstanding guard are unaffected.
    pub fn forget(&self, application_id: ApplicationId) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&application_id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_application_is_serialized() {
        let locks = Arc::new(ApplicationLocks::new());
        let id = ApplicationId::new(1);

        let guard = locks.lock(id).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_applications_do_not_block() {
        let locks = ApplicationLocks::new();
        let _first = locks.lock(ApplicationId::new(1)).await;

        let second = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(ApplicationId::new(2)),
        )
        .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn forget_removes_entry() {
        let locks = ApplicationLocks::new();
        drop(locks.lock(ApplicationId::new(7)).await);
        assert_eq!(locks.len(), 1);

        locks.forget(ApplicationId::new(7));
        assert_eq!(locks.len(), 0);
    }
}
