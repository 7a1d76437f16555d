// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Discord Integration
//!
//! The bot runs as an HTTP interactions endpoint rather than a gateway
//! client:
//!
//! 1. Discord POSTs each interaction to `/interactions`
//! 2. The request signature is checked against the application public key
//! 3. The handler answers synchronously with an interaction response
//!
//! Slash commands are registered over REST at startup.

pub mod commands;
pub mod interaction;
pub mod verify;

pub use commands::{claim_command, CommandRegistrar, DiscordError, CLAIM_COMMAND, WALLET_OPTION};
pub use interaction::{
    ActionRow, Button, ButtonStyle, Embed, Interaction, InteractionResponse, InteractionType,
    MessageData,
};
pub use verify::{RequestVerifier, VerifyError};
