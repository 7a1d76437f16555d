// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable claim record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::WalletAddress;

/// A confirmed claim, keyed by platform user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimRecord {
    /// Platform user id (unique key)
    pub user_id: String,
    /// Wallet the user bound their claim to
    pub wallet: WalletAddress,
    /// When the claim was first confirmed
    pub claimed_at: DateTime<Utc>,
}

impl ClaimRecord {
    /// Create a record stamped with the current time.
    pub fn new(user_id: impl Into<String>, wallet: WalletAddress) -> Self {
        Self {
            user_id: user_id.into(),
            wallet,
            claimed_at: Utc::now(),
        }
    }
}
