// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Discord interactions webhook.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use tracing::{debug, warn};

use super::messages::{self, ButtonAction, ButtonTarget};
use crate::{
    discord::{Interaction, InteractionResponse, InteractionType, CLAIM_COMMAND, WALLET_OPTION},
    error::ApiError,
    models::WalletAddress,
    state::AppState,
};

/// Interactions endpoint handler.
///
/// Verifies the Ed25519 request signature, then answers pings, the `/claim`
/// command and the Yes/No buttons of the confirmation prompt.
#[utoipa::path(
    post,
    path = "/interactions",
    tag = "Interactions",
    request_body(
        content = String,
        content_type = "application/json",
        description = "Discord interaction payload, signed by Discord"
    ),
    responses(
        (status = 200, description = "Interaction response"),
        (status = 400, description = "Malformed interaction payload"),
        (status = 401, description = "Missing or invalid request signature")
    )
)]
pub async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, ApiError> {
    if let Err(e) = state.verifier.verify_request(&headers, &body) {
        warn!(error = %e, "Rejected interaction with invalid signature");
        return Err(ApiError::unauthorized("invalid request signature"));
    }

    let interaction: Interaction = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Malformed interaction payload");
        ApiError::bad_request("malformed interaction payload")
    })?;

    debug!(
        interaction_id = %interaction.id,
        kind = ?interaction.kind,
        guild_id = ?interaction.guild_id,
        "Interaction received"
    );
    Ok(Json(dispatch(&state, &interaction).await))
}

async fn dispatch(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    match interaction.kind {
        InteractionType::Ping => InteractionResponse::pong(),
        InteractionType::ApplicationCommand => handle_command(state, interaction).await,
        InteractionType::MessageComponent => handle_button(state, interaction).await,
        _ => messages::notice(messages::UNKNOWN_INTERACTION),
    }
}

async fn handle_command(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    if interaction.command_name() != Some(CLAIM_COMMAND) {
        return messages::notice(messages::UNKNOWN_INTERACTION);
    }
    let Some(invoker) = interaction.invoker() else {
        return messages::notice(messages::UNKNOWN_INTERACTION);
    };
    let Some(wallet) = interaction.string_option(WALLET_OPTION) else {
        return messages::notice(messages::MISSING_WALLET);
    };

    let intake = state
        .workflow
        .intake(&invoker, WalletAddress::from(wallet))
        .await;
    messages::intake_response(&invoker.user_id, &intake)
}

async fn handle_button(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    let Some(ButtonTarget {
        action,
        owner,
        session,
    }) = interaction.custom_id().and_then(messages::parse_button_id)
    else {
        return messages::notice(messages::UNKNOWN_INTERACTION);
    };
    let Some(invoker) = interaction.invoker() else {
        return messages::notice(messages::UNKNOWN_INTERACTION);
    };
    if invoker.user_id != owner {
        warn!(
            user_id = %invoker.user_id,
            owner = %owner,
            "Button pressed on another member's claim prompt"
        );
        return messages::notice(messages::NOT_YOUR_PROMPT);
    }

    let resolution = match action {
        ButtonAction::Confirm => state.workflow.confirm(&invoker.user_id, session).await,
        ButtonAction::Cancel => state.workflow.cancel(&invoker.user_id, session).await,
    };
    messages::resolution_response(&resolution)
}
