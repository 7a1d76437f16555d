// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache of claims awaiting confirmation.
//!
//! Holds one wallet per user between the `/claim` command and the Yes/No
//! button press. Entries expire after a fixed TTL; the cache is bounded and
//! evicts the least recently touched session when full.
//!
//! Every insert opens a new session id. The id is carried by the prompt's
//! buttons, so a press on a prompt that was replaced by a later `/claim`
//! never resolves the newer session.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::models::WalletAddress;

/// Identifies one `/claim` prompt for a user.
pub type SessionId = u64;

/// Cached entry: proposed wallet, its session and insertion timestamp.
struct PendingEntry {
    wallet: WalletAddress,
    session: SessionId,
    inserted_at: Instant,
}

/// Result of removing a pending claim for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingLookup {
    /// A live pending claim was found (and removed).
    Found(WalletAddress),
    /// A pending claim existed but its TTL had elapsed (removed).
    Expired,
    /// The user has a newer session than the one pressed. Left in place.
    Superseded,
    /// No pending claim for this user.
    Missing,
}

/// In-process store of pending claims, keyed by user id.
pub struct PendingClaims {
    cache: Mutex<LruCache<String, PendingEntry>>,
    ttl: Duration,
    next_session: AtomicU64,
}

impl PendingClaims {
    /// Create a new cache with the given capacity and TTL.
    ///
    /// - `capacity`: Max number of concurrent claim sessions.
    /// - `ttl`: How long a session may wait for confirmation.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
            next_session: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, PendingEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store (or overwrite) the pending wallet for a user.
    ///
    /// Returns the new session id and the wallet that was replaced, if any.
    pub fn insert(&self, user_id: &str, wallet: WalletAddress) -> (SessionId, Option<WalletAddress>) {
        let session = self.next_session.fetch_add(1, Ordering::Relaxed);
        let replaced = self
            .lock()
            .put(
                user_id.to_string(),
                PendingEntry {
                    wallet,
                    session,
                    inserted_at: Instant::now(),
                },
            )
            .map(|previous| previous.wallet);
        (session, replaced)
    }

    /// Remove the pending claim for a user if `session` is still the current
    /// one, reporting whether it was still live.
    pub fn take(&self, user_id: &str, session: SessionId) -> PendingLookup {
        let mut cache = self.lock();
        match cache.peek(user_id) {
            None => return PendingLookup::Missing,
            Some(entry) if entry.session != session => return PendingLookup::Superseded,
            Some(_) => {}
        }
        match cache.pop(user_id) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                PendingLookup::Found(entry.wallet)
            }
            Some(_) => PendingLookup::Expired,
            None => PendingLookup::Missing,
        }
    }

    /// Drop the pending claim for a user regardless of expiry, as long as
    /// `session` is still the current one.
    ///
    /// Returns `true` if an entry was removed.
    pub fn discard(&self, user_id: &str, session: SessionId) -> bool {
        let mut cache = self.lock();
        if cache.peek(user_id).is_some_and(|entry| entry.session == session) {
            cache.pop(user_id);
            true
        } else {
            false
        }
    }

    /// Peek at a live pending wallet without removing it.
    #[cfg(test)]
    pub(crate) fn get(&self, user_id: &str) -> Option<WalletAddress> {
        let cache = self.lock();
        cache
            .peek(user_id)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.wallet.clone())
    }

    /// Evict every expired entry. Returns the number evicted.
    pub fn purge_expired(&self) -> usize {
        let mut cache = self.lock();
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.inserted_at.elapsed() >= self.ttl)
            .map(|(user_id, _)| user_id.clone())
            .collect();

        for user_id in &expired {
            cache.pop(user_id);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_take() {
        let pending = PendingClaims::new(10, Duration::from_secs(300));
        let (session, replaced) = pending.insert("U1", WalletAddress::from("0xABC"));
        assert!(replaced.is_none());
        assert_eq!(pending.get("U1"), Some(WalletAddress::from("0xABC")));

        assert_eq!(
            pending.take("U1", session),
            PendingLookup::Found(WalletAddress::from("0xABC"))
        );
        assert_eq!(pending.take("U1", session), PendingLookup::Missing);
        assert!(pending.is_empty());
    }

    #[test]
    fn repeated_claim_overwrites() {
        let pending = PendingClaims::new(10, Duration::from_secs(300));
        let (first, _) = pending.insert("U1", WalletAddress::from("0xABC"));
        let (second, replaced) = pending.insert("U1", WalletAddress::from("0xDEF"));

        assert_ne!(first, second);
        assert_eq!(replaced, Some(WalletAddress::from("0xABC")));
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending.take("U1", second),
            PendingLookup::Found(WalletAddress::from("0xDEF"))
        );
    }

    #[test]
    fn old_session_cannot_take_or_discard_newer_one() {
        let pending = PendingClaims::new(10, Duration::from_secs(300));
        let (old, _) = pending.insert("U1", WalletAddress::from("0xAAA"));
        let (current, _) = pending.insert("U1", WalletAddress::from("0xBBB"));

        assert_eq!(pending.take("U1", old), PendingLookup::Superseded);
        assert!(!pending.discard("U1", old));
        assert_eq!(pending.get("U1"), Some(WalletAddress::from("0xBBB")));

        assert!(pending.discard("U1", current));
        assert!(pending.is_empty());
    }

    #[test]
    fn ttl_expiry() {
        let pending = PendingClaims::new(10, Duration::from_millis(1));
        let (session, _) = pending.insert("U1", WalletAddress::from("0xABC"));

        // Wait for TTL to expire
        std::thread::sleep(Duration::from_millis(5));

        assert!(pending.get("U1").is_none());
        assert_eq!(pending.take("U1", session), PendingLookup::Expired);
        assert!(pending.is_empty());
    }

    #[test]
    fn purge_only_removes_expired() {
        let pending = PendingClaims::new(10, Duration::from_millis(20));
        pending.insert("old", WalletAddress::from("0x1"));
        std::thread::sleep(Duration::from_millis(30));
        pending.insert("fresh", WalletAddress::from("0x2"));

        assert_eq!(pending.purge_expired(), 1);
        assert_eq!(pending.len(), 1);
        assert!(pending.get("fresh").is_some());
    }

    #[test]
    fn discard_ignores_expiry() {
        let pending = PendingClaims::new(10, Duration::from_millis(1));
        let (session, _) = pending.insert("U1", WalletAddress::from("0xABC"));
        std::thread::sleep(Duration::from_millis(5));

        assert!(pending.discard("U1", session));
        assert!(!pending.discard("U1", session));
    }

    #[test]
    fn capacity_evicts_least_recent() {
        let pending = PendingClaims::new(2, Duration::from_secs(300));
        let (a, _) = pending.insert("a", WalletAddress::from("0x1"));
        pending.insert("b", WalletAddress::from("0x2"));
        pending.insert("c", WalletAddress::from("0x3"));

        assert_eq!(pending.len(), 2);
        assert_eq!(pending.take("a", a), PendingLookup::Missing);
    }
}
