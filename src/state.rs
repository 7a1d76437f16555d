// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::claim::ClaimWorkflow;
use crate::discord::RequestVerifier;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ClaimWorkflow>,
    pub verifier: Arc<RequestVerifier>,
}

impl AppState {
    pub fn new(workflow: Arc<ClaimWorkflow>, verifier: RequestVerifier) -> Self {
        Self {
            workflow,
            verifier: Arc::new(verifier),
        }
    }
}
