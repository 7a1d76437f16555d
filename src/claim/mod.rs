// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Claim Workflow
//!
//! One member, one wallet, one signature:
//!
//! 1. `/claim <wallet>` stores a pending claim and asks for confirmation
//! 2. "Yes" checks the claims database, records the wallet on first claim and
//!    signs `pedersen(user_id, wallet)`
//! 3. "No" drops the pending claim
//!
//! Pending claims live in memory only and expire after a TTL.

pub mod guard;
pub mod pending;
pub mod sweeper;
pub mod workflow;

pub use guard::UserLocks;
pub use pending::{PendingClaims, PendingLookup, SessionId};
pub use sweeper::PendingSweeper;
pub use workflow::{
    Authorization, ClaimError, ClaimWorkflow, Intake, Resolution, WorkflowSettings,
};
