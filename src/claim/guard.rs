// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user single-flight guard.
//!
//! Discord may deliver the same button press twice, and a member can hit
//! "Yes" and "No" in quick succession. Every transition for a user runs while
//! holding that user's lock, so the second handler sees the state the first
//! one left behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Map of per-user async locks.
///
/// Entries are created on demand and removed once no task holds or waits on
/// them, so the map only grows with concurrently active users.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<LockMap>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for exclusive access to the given user's transitions.
    pub async fn acquire(&self, user_id: &str) -> UserGuard<'_> {
        let lock = self
            .map()
            .entry(user_id.to_string())
            .or_default()
            .clone();

        let guard = lock.lock_owned().await;
        UserGuard {
            locks: self,
            user_id: user_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of users with a live lock entry.
    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.map().len()
    }
}

/// Held while a user's transition runs; releases and cleans up on drop.
pub struct UserGuard<'a> {
    locks: &'a UserLocks,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        // Release first so the strong count below only reflects waiters.
        self.guard.take();

        let mut map = self.locks.map();
        if let Some(lock) = map.get(&self.user_id) {
            if Arc::strong_count(lock) == 1 {
                map.remove(&self.user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = Arc::new(UserLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("U1").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn different_users_do_not_block() {
        let locks = UserLocks::new();
        let _a = locks.acquire("U1").await;

        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("U2")).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn entry_removed_after_release() {
        let locks = UserLocks::new();
        {
            let _guard = locks.acquire("U1").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
