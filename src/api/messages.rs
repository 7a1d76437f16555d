// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member-facing messages for each claim outcome.

use crate::claim::{Authorization, Intake, Resolution, SessionId};
use crate::discord::{ActionRow, Button, ButtonStyle, Embed, InteractionResponse, MessageData};
use crate::models::WalletAddress;

pub const CLAIM_TITLE: &str = "Claim your OG domain";
pub const NO_ROLE: &str = "❌ You do not have the OG role";
pub const NOT_A_WALLET: &str = "❌ This is not a wallet address.";
pub const CANCELLED: &str = "❌ Cancelled.";
pub const EXPIRED: &str = "❌ This claim request has expired. Run /claim again.";
pub const NO_PENDING_CLAIM: &str = "❌ No pending claim found. Run /claim again.";
pub const NOT_YOUR_PROMPT: &str = "❌ This claim prompt belongs to someone else.";
pub const MISSING_WALLET: &str = "❌ Please provide your mainnet wallet address.";
pub const UNKNOWN_INTERACTION: &str = "❌ Unknown interaction.";

const BUTTON_PREFIX: &str = "claim";

/// Which prompt button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Confirm,
    Cancel,
}

impl ButtonAction {
    fn as_str(self) -> &'static str {
        match self {
            ButtonAction::Confirm => "confirm",
            ButtonAction::Cancel => "cancel",
        }
    }
}

/// Decoded custom id of a prompt button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTarget<'a> {
    pub action: ButtonAction,
    /// Member who ran `/claim`.
    pub owner: &'a str,
    /// Session the prompt was opened with.
    pub session: SessionId,
}

/// Custom id for a prompt button, bound to the member who ran `/claim` and
/// to the session that prompt belongs to.
pub fn button_id(action: ButtonAction, user_id: &str, session: SessionId) -> String {
    format!("{BUTTON_PREFIX}:{}:{user_id}:{session}", action.as_str())
}

/// Parse a custom id produced by [`button_id`].
pub fn parse_button_id(custom_id: &str) -> Option<ButtonTarget<'_>> {
    let mut parts = custom_id.splitn(4, ':');
    if parts.next()? != BUTTON_PREFIX {
        return None;
    }
    let action = match parts.next()? {
        "confirm" => ButtonAction::Confirm,
        "cancel" => ButtonAction::Cancel,
        _ => return None,
    };
    let owner = parts.next().filter(|owner| !owner.is_empty())?;
    let session = parts.next()?.parse().ok()?;
    Some(ButtonTarget {
        action,
        owner,
        session,
    })
}

/// Ephemeral text reply.
pub fn notice(content: &str) -> InteractionResponse {
    InteractionResponse::ephemeral(MessageData::text(content))
}

/// Reply to `/claim`.
pub fn intake_response(user_id: &str, intake: &Intake) -> InteractionResponse {
    match intake {
        Intake::Unauthorized => notice(NO_ROLE),
        Intake::AwaitingConfirmation { wallet, session } => {
            confirmation_prompt(user_id, wallet, *session)
        }
    }
}

fn confirmation_prompt(
    user_id: &str,
    wallet: &WalletAddress,
    session: SessionId,
) -> InteractionResponse {
    let description = format!(
        "Your wallet address is: {wallet}\n\
         After clicking Yes, you won't be able to change your wallet address. \
         Are you sure you want to continue? Check you provided a valid **mainnet** wallet address."
    );

    InteractionResponse::ephemeral(
        MessageData::default()
            .with_embed(Embed::titled(CLAIM_TITLE).with_description(description))
            .with_row(ActionRow::new(vec![
                Button::action(
                    ButtonStyle::Success,
                    "Yes",
                    button_id(ButtonAction::Confirm, user_id, session),
                ),
                Button::action(
                    ButtonStyle::Danger,
                    "No",
                    button_id(ButtonAction::Cancel, user_id, session),
                ),
            ])),
    )
}

/// Response to a confirm/cancel press.
///
/// Terminal outcomes replace the prompt. `NoPendingClaim` answers with a new
/// ephemeral message so a prompt that already shows a result is left alone.
pub fn resolution_response(resolution: &Resolution) -> InteractionResponse {
    match resolution {
        Resolution::New(auth) | Resolution::Reissue(auth) => claim_link(auth),
        Resolution::Conflict { existing_wallet } => InteractionResponse::update(MessageData::text(
            format!(
                "❌ You already claimed your OG domain, for the following address : {existing_wallet}"
            ),
        )),
        Resolution::Failed(_) => InteractionResponse::update(MessageData::text(NOT_A_WALLET)),
        Resolution::Expired => InteractionResponse::update(MessageData::text(EXPIRED)),
        Resolution::Cancelled => InteractionResponse::update(MessageData::text(CANCELLED)),
        Resolution::NoPendingClaim => notice(NO_PENDING_CLAIM),
    }
}

fn claim_link(auth: &Authorization) -> InteractionResponse {
    InteractionResponse::update(MessageData {
        content: None,
        embeds: Some(vec![Embed::titled(CLAIM_TITLE)]),
        components: Some(vec![ActionRow::new(vec![Button::link(
            "Claim",
            auth.link.as_str(),
        )])]),
        flags: None,
    })
}
