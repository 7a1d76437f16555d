// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Models
//!
//! Small value types shared by the claim workflow, the storage layer and the
//! Discord interaction layer.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps the address exactly as the member typed
//! it. No format validation happens at intake; an address that cannot be
//! hashed as a Stark field element is rejected when the claim is confirmed.

use serde::{Deserialize, Serialize};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Mainnet wallet address submitted with a claim.
///
/// Comparison is exact: `0xabc` and `0xABC` are different claims.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::from("0x04a3f1...");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Invoker
// =============================================================================

/// The member who triggered an interaction.
///
/// Roles are only present for interactions sent from a guild; direct messages
/// carry a user without roles and can never pass the role gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    /// Platform user id (Discord snowflake).
    pub user_id: String,
    /// Role ids held in the guild the interaction came from.
    pub role_ids: Vec<String>,
}

impl Invoker {
    pub fn new(user_id: impl Into<String>, role_ids: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role_ids,
        }
    }

    /// Check whether the invoker holds the given role.
    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|r| r == role_id)
    }
}
