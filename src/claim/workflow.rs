// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim issuance state machine.
//!
//! ```text
//! Idle ──/claim──▶ AwaitingConfirmation ──Yes──▶ New | Reissue | Conflict | Failed | Expired
//!   │                        │
//!   └─ no role: Unauthorized └──No───▶ Cancelled
//! ```
//!
//! Every transition for a user runs under that user's [`UserLocks`] guard and
//! every terminal outcome leaves no pending claim behind. Confirm and cancel
//! name the session they answer; a press on a superseded prompt resolves to
//! `NoPendingClaim` and leaves the newer session untouched.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use super::guard::UserLocks;
use super::pending::{PendingClaims, PendingLookup, SessionId};
use crate::models::{Invoker, WalletAddress};
use crate::signing::{ClaimSignature, ClaimSigner, SignerError};
use crate::storage::{ClaimRecord, ClaimStore, StorageError};

/// Internal classification of a failed confirmation.
///
/// Members only ever see the generic "not a wallet address" message; the
/// variant is logged so operators can tell a bad address from a broken store.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("claims store error: {0}")]
    Store(#[from] StorageError),

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),
}

impl ClaimError {
    /// Short label for structured logs.
    pub fn class(&self) -> &'static str {
        match self {
            ClaimError::Store(_) => "store",
            ClaimError::Signer(SignerError::InvalidFieldElement { .. }) => "invalid_wallet",
            ClaimError::Signer(_) => "signer",
        }
    }
}

/// Result of the `/claim` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Pending claim stored; the member must confirm this wallet.
    AwaitingConfirmation {
        wallet: WalletAddress,
        session: SessionId,
    },
    /// The member lacks the required role. Nothing was stored.
    Unauthorized,
}

/// Signed authorization handed back to the member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub wallet: WalletAddress,
    pub signature: ClaimSignature,
    /// `<claim site>?signature=<sig>&wallet=<wallet>`
    pub link: Url,
}

/// Terminal outcome of a confirm or cancel.
#[derive(Debug)]
pub enum Resolution {
    /// First claim for this user; record written.
    New(Authorization),
    /// Same wallet claimed again; authorization reissued, nothing written.
    Reissue(Authorization),
    /// User already claimed a different wallet. No signature issued.
    Conflict { existing_wallet: WalletAddress },
    /// Store or signer failure.
    Failed(ClaimError),
    /// The pending claim outlived its TTL.
    Expired,
    /// The member pressed "No".
    Cancelled,
    /// Nothing pending for this session (already resolved, superseded by a
    /// later `/claim`, or never started).
    NoPendingClaim,
}

impl Resolution {
    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::New(_) => "new",
            Resolution::Reissue(_) => "reissue",
            Resolution::Conflict { .. } => "conflict",
            Resolution::Failed(_) => "failed",
            Resolution::Expired => "expired",
            Resolution::Cancelled => "cancelled",
            Resolution::NoPendingClaim => "no_pending_claim",
        }
    }

    pub fn authorization(&self) -> Option<&Authorization> {
        match self {
            Resolution::New(auth) | Resolution::Reissue(auth) => Some(auth),
            _ => None,
        }
    }
}

/// Static workflow settings.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Role id a member must hold to claim.
    pub required_role_id: String,
    /// Base URL of the claim website.
    pub claim_site: Url,
}

/// Orchestrates intake, confirmation and cancellation of claims.
pub struct ClaimWorkflow {
    settings: WorkflowSettings,
    store: Arc<dyn ClaimStore>,
    signer: Arc<dyn ClaimSigner>,
    pending: PendingClaims,
    locks: UserLocks,
}

enum IssueKind {
    New,
    Reissue,
}

impl ClaimWorkflow {
    pub fn new(
        settings: WorkflowSettings,
        store: Arc<dyn ClaimStore>,
        signer: Arc<dyn ClaimSigner>,
        pending: PendingClaims,
    ) -> Self {
        Self {
            settings,
            store,
            signer,
            pending,
            locks: UserLocks::new(),
        }
    }

    pub fn pending(&self) -> &PendingClaims {
        &self.pending
    }

    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    /// Handle the `/claim` command.
    pub async fn intake(&self, invoker: &Invoker, wallet: WalletAddress) -> Intake {
        if !invoker.has_role(&self.settings.required_role_id) {
            info!(user_id = %invoker.user_id, "Claim rejected: missing required role");
            return Intake::Unauthorized;
        }

        let _guard = self.locks.acquire(&invoker.user_id).await;
        let (session, replaced) = self.pending.insert(&invoker.user_id, wallet.clone());
        if let Some(previous) = replaced {
            debug!(
                user_id = %invoker.user_id,
                previous = %previous,
                "Replaced pending claim"
            );
        }

        info!(
            user_id = %invoker.user_id,
            wallet = %wallet,
            session,
            "Claim awaiting confirmation"
        );
        Intake::AwaitingConfirmation { wallet, session }
    }

    /// Handle the "Yes" button of the prompt opened as `session`.
    pub async fn confirm(&self, user_id: &str, session: SessionId) -> Resolution {
        let _guard = self.locks.acquire(user_id).await;

        let wallet = match self.pending.take(user_id, session) {
            PendingLookup::Found(wallet) => wallet,
            PendingLookup::Expired => {
                info!(user_id = %user_id, "Claim confirmation after expiry");
                return Resolution::Expired;
            }
            PendingLookup::Superseded => {
                warn!(user_id = %user_id, session, "Confirmation from a superseded prompt");
                return Resolution::NoPendingClaim;
            }
            PendingLookup::Missing => {
                warn!(user_id = %user_id, "Claim confirmation without pending claim");
                return Resolution::NoPendingClaim;
            }
        };

        let resolution = match self.resolve(user_id, &wallet) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    wallet = %wallet,
                    error_class = e.class(),
                    error = %e,
                    "Claim confirmation failed"
                );
                Resolution::Failed(e)
            }
        };

        info!(
            user_id = %user_id,
            wallet = %wallet,
            outcome = resolution.label(),
            signed = resolution.authorization().is_some(),
            "Claim resolved"
        );
        resolution
    }

    /// Handle the "No" button. Never touches the store or the signer.
    pub async fn cancel(&self, user_id: &str, session: SessionId) -> Resolution {
        let _guard = self.locks.acquire(user_id).await;

        if self.pending.discard(user_id, session) {
            info!(user_id = %user_id, session, "Claim cancelled");
            Resolution::Cancelled
        } else {
            debug!(user_id = %user_id, session, "Cancel without pending claim");
            Resolution::NoPendingClaim
        }
    }

    /// Conflict check, persistence and signing for a confirmed wallet.
    ///
    /// The message is hashed before anything is written so an address that is
    /// not a field element never ends up on record.
    fn resolve(&self, user_id: &str, wallet: &WalletAddress) -> Result<Resolution, ClaimError> {
        let message = self.signer.message_hash(&[user_id, wallet.as_str()])?;

        let kind = match self.store.find_by_user_id(user_id)? {
            Some(record) if record.wallet != *wallet => {
                return Ok(Resolution::Conflict {
                    existing_wallet: record.wallet,
                });
            }
            Some(_) => IssueKind::Reissue,
            None => match self.store.insert(&ClaimRecord::new(user_id, wallet.clone())) {
                Ok(()) => IssueKind::New,
                Err(StorageError::AlreadyExists(_)) => {
                    // Lost a race with another writer; go with what is on record.
                    match self.store.find_by_user_id(user_id)? {
                        Some(record) if record.wallet != *wallet => {
                            return Ok(Resolution::Conflict {
                                existing_wallet: record.wallet,
                            });
                        }
                        _ => IssueKind::Reissue,
                    }
                }
                Err(e) => return Err(e.into()),
            },
        };

        let signature = self.signer.sign(&message)?;
        let authorization = Authorization {
            link: self.claim_link(&signature, wallet),
            wallet: wallet.clone(),
            signature,
        };

        Ok(match kind {
            IssueKind::New => Resolution::New(authorization),
            IssueKind::Reissue => Resolution::Reissue(authorization),
        })
    }

    fn claim_link(&self, signature: &ClaimSignature, wallet: &WalletAddress) -> Url {
        let mut link = self.settings.claim_site.clone();
        link.query_pairs_mut()
            .append_pair("signature", &signature.to_string())
            .append_pair("wallet", wallet.as_str());
        link
    }
}
