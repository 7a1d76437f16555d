// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Pending Claim Sweeper
//!
//! Background task that evicts abandoned claim sessions. Confirmation already
//! refuses expired entries; the sweep keeps the cache from holding them until
//! the member comes back (or never does).
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::ClaimWorkflow;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically purges expired pending claims.
pub struct PendingSweeper {
    workflow: Arc<ClaimWorkflow>,
    interval: Duration,
}

impl PendingSweeper {
    pub fn new(workflow: Arc<ClaimWorkflow>) -> Self {
        Self {
            workflow,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            ttl_secs = self.workflow.pending().ttl().as_secs(),
            "Pending claim sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Pending claim sweeper shutting down");
                    return;
                }
            }

            self.sweep();
        }
    }

    /// Execute one sweep. Returns the number of evicted sessions.
    pub fn sweep(&self) -> usize {
        let evicted = self.workflow.pending().purge_expired();
        if evicted > 0 {
            debug!(
                evicted,
                remaining = self.workflow.pending().len(),
                "Evicted expired pending claims"
            );
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{PendingClaims, WorkflowSettings};
    use crate::models::{Invoker, WalletAddress};
    use crate::signing::StarkSigner;
    use crate::storage::ClaimDatabase;

    fn workflow(dir: &tempfile::TempDir, ttl: Duration) -> Arc<ClaimWorkflow> {
        let store = Arc::new(ClaimDatabase::open(&dir.path().join("claims.redb")).unwrap());
        let signer = Arc::new(StarkSigner::from_private_key("0x1234").unwrap());
        Arc::new(ClaimWorkflow::new(
            WorkflowSettings {
                required_role_id: "1".to_string(),
                claim_site: url::Url::parse("https://claim.example.com").unwrap(),
            },
            store,
            signer,
            PendingClaims::new(10, ttl),
        ))
    }

    #[tokio::test]
    async fn sweep_evicts_expired_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(&dir, Duration::from_millis(1));
        workflow
            .intake(
                &Invoker::new("U1", vec!["1".to_string()]),
                WalletAddress::from("0xabc"),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let sweeper = PendingSweeper::new(workflow.clone());
        assert_eq!(sweeper.sweep(), 1);
        assert!(workflow.pending().is_empty());
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let sweeper = PendingSweeper::new(workflow(&dir, Duration::from_secs(60)))
            .with_interval(Duration::from_millis(5));
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(sweeper.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper stops")
            .unwrap();
    }
}
