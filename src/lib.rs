// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain Claim Bot - Discord interactions service for OG domain claims
//!
//! Members holding the OG role run `/claim <wallet>`, confirm the address,
//! and receive a link carrying a Stark signature over `(user_id, wallet)`.
//! Each member can bind exactly one wallet; the binding is kept in an
//! embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum): interactions webhook, health probes
//! - `claim` - Claim workflow, pending-confirmation cache, per-user locks
//! - `discord` - Interaction wire types, request verification, command registration
//! - `signing` - Pedersen hashing and Stark signatures
//! - `storage` - Claims database (redb)

pub mod api;
pub mod claim;
pub mod config;
pub mod discord;
pub mod error;
pub mod models;
pub mod signing;
pub mod state;
pub mod storage;
pub mod telemetry;
