// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Claims Storage Module
//!
//! Durable record of which wallet each member claimed.
//!
//! ## Table Layout
//!
//! ```text
//! claims.redb
//!   users: user_id → ClaimRecord (JSON bytes)
//! ```
//!
//! ## Guarantees
//!
//! - At most one record per `user_id`; `insert` fails with
//!   [`StorageError::AlreadyExists`] instead of overwriting.
//! - Records are never updated or deleted through this module.
//! - Every operation runs in its own redb transaction, released when the
//!   operation returns (including on error).

pub mod claims_db;
pub mod record;

pub use claims_db::{ClaimDatabase, StorageError, StorageResult};
pub use record::ClaimRecord;

/// Persistence contract consumed by the claim workflow.
///
/// Implementations must enforce the one-record-per-user constraint inside
/// `insert` itself; callers only pre-check with `find_by_user_id`.
pub trait ClaimStore: Send + Sync {
    /// Look up the claim recorded for a user.
    fn find_by_user_id(&self, user_id: &str) -> StorageResult<Option<ClaimRecord>>;

    /// Persist a new claim. Returns `AlreadyExists` if the user already has one.
    fn insert(&self, record: &ClaimRecord) -> StorageResult<()>;

    /// Check that the backing store is reachable.
    fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
