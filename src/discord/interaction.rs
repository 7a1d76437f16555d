// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Discord interaction payloads and responses.
//!
//! Only the fields the bot reads or writes are modelled; unknown fields are
//! ignored on input and omitted on output.

use serde::{Deserialize, Serialize};

use super::commands::STRING_OPTION;
use crate::models::Invoker;

/// Message flag making a reply visible to the invoker only.
pub const EPHEMERAL: u64 = 1 << 6;

// =============================================================================
// Inbound
// =============================================================================

/// Interaction kind (`type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
}

impl TryFrom<u8> for InteractionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(InteractionType::Ping),
            2 => Ok(InteractionType::ApplicationCommand),
            3 => Ok(InteractionType::MessageComponent),
            4 => Ok(InteractionType::ApplicationCommandAutocomplete),
            5 => Ok(InteractionType::ModalSubmit),
            other => Err(format!("unknown interaction type {other}")),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
        }
    }
}

/// An interaction delivered to the webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Present for interactions sent from a guild
    #[serde(default)]
    pub member: Option<GuildMember>,
    /// Present for interactions sent from a DM
    #[serde(default)]
    pub user: Option<User>,
}

impl Interaction {
    /// Resolve who triggered the interaction, with their guild roles.
    pub fn invoker(&self) -> Option<Invoker> {
        if let Some(member) = &self.member {
            let user = member.user.as_ref().or(self.user.as_ref())?;
            return Some(Invoker::new(user.id.clone(), member.roles.clone()));
        }
        self.user
            .as_ref()
            .map(|user| Invoker::new(user.id.clone(), Vec::new()))
    }

    /// Slash command name, for application command interactions.
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref()?.name.as_deref()
    }

    /// Button custom id, for message component interactions.
    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref()?.custom_id.as_deref()
    }

    /// String value of a named command option.
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|opt| opt.name == name && opt.kind == STRING_OPTION)?
            .value
            .as_ref()?
            .as_str()
    }
}

/// Union of command and component interaction data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    /// Command name (application commands)
    #[serde(default)]
    pub name: Option<String>,
    /// Command options (application commands)
    #[serde(default)]
    pub options: Vec<CommandOption>,
    /// Component custom id (message components)
    #[serde(default)]
    pub custom_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
}

// =============================================================================
// Outbound
// =============================================================================

/// Interaction callback kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ResponseType {
    Pong,
    ChannelMessageWithSource,
    UpdateMessage,
}

impl From<ResponseType> for u8 {
    fn from(value: ResponseType) -> Self {
        match value {
            ResponseType::Pong => 1,
            ResponseType::ChannelMessageWithSource => 4,
            ResponseType::UpdateMessage => 7,
        }
    }
}

/// Body returned to Discord from the webhook.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: ResponseType::Pong,
            data: None,
        }
    }

    /// New message visible only to the invoker.
    pub fn ephemeral(data: MessageData) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource,
            data: Some(data.with_flags(EPHEMERAL)),
        }
    }

    /// Replace the message the pressed component belongs to.
    pub fn update(data: MessageData) -> Self {
        Self {
            kind: ResponseType::UpdateMessage,
            data: Some(data),
        }
    }
}

/// Message content. `Some(vec![])` clears embeds/components on update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessageData {
    /// Plain text that also strips any embeds and buttons.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Some(Vec::new()),
            components: Some(Vec::new()),
            flags: None,
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.get_or_insert_with(Vec::new).push(embed);
        self
    }

    pub fn with_row(mut self, row: ActionRow) -> Self {
        self.components.get_or_insert_with(Vec::new).push(row);
        self
    }

    pub fn with_flags(mut self, flags: u64) -> Self {
        self.flags = Some(self.flags.unwrap_or(0) | flags);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Embed {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Component container (`type` 1).
#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: u8,
    pub components: Vec<Button>,
}

impl ActionRow {
    pub fn new(components: Vec<Button>) -> Self {
        Self {
            kind: 1,
            components,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ButtonStyle {
    Success,
    Danger,
    Link,
}

impl From<ButtonStyle> for u8 {
    fn from(value: ButtonStyle) -> Self {
        match value {
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
            ButtonStyle::Link => 5,
        }
    }
}

/// Button component (`type` 2).
#[derive(Debug, Clone, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: u8,
    pub style: ButtonStyle,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Button {
    /// Button that sends an interaction back with `custom_id`.
    pub fn action(style: ButtonStyle, label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            kind: 2,
            style,
            label: label.into(),
            custom_id: Some(custom_id.into()),
            url: None,
        }
    }

    /// Button that opens a URL.
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: 2,
            style: ButtonStyle::Link,
            label: label.into(),
            custom_id: None,
            url: Some(url.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_guild_command() {
        let payload = json!({
            "id": "1",
            "type": 2,
            "token": "abc",
            "guild_id": "77",
            "data": {
                "id": "555",
                "name": "claim",
                "type": 1,
                "options": [
                    { "name": "mainnet-wallet-address", "type": 3, "value": "0xabc" }
                ]
            },
            "member": {
                "user": { "id": "1001", "username": "alice" },
                "roles": ["999", "5"]
            }
        });

        let interaction: Interaction = serde_json::from_value(payload).unwrap();
        assert_eq!(interaction.kind, InteractionType::ApplicationCommand);
        assert_eq!(interaction.guild_id.as_deref(), Some("77"));
        assert_eq!(interaction.command_name(), Some("claim"));
        assert_eq!(interaction.string_option("mainnet-wallet-address"), Some("0xabc"));
        assert_eq!(interaction.string_option("other"), None);

        let invoker = interaction.invoker().unwrap();
        assert_eq!(invoker.user_id, "1001");
        assert!(invoker.has_role("999"));
    }

    #[test]
    fn non_string_option_is_not_read_as_wallet() {
        let payload = json!({
            "id": "1",
            "type": 2,
            "data": {
                "name": "claim",
                "options": [{ "name": "mainnet-wallet-address", "type": 4, "value": 12 }]
            },
            "member": { "user": { "id": "1001" }, "roles": [] }
        });

        let interaction: Interaction = serde_json::from_value(payload).unwrap();
        assert_eq!(interaction.string_option("mainnet-wallet-address"), None);
    }

    #[test]
    fn dm_invoker_has_no_roles() {
        let payload = json!({
            "id": "1",
            "type": 3,
            "data": { "custom_id": "claim:confirm:1001:1", "component_type": 2 },
            "user": { "id": "1001" }
        });

        let interaction: Interaction = serde_json::from_value(payload).unwrap();
        assert_eq!(interaction.custom_id(), Some("claim:confirm:1001:1"));
        assert!(interaction.guild_id.is_none());
        let invoker = interaction.invoker().unwrap();
        assert!(invoker.role_ids.is_empty());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<Interaction, _> = serde_json::from_value(json!({ "id": "1", "type": 42 }));
        assert!(result.is_err());
    }

    #[test]
    fn pong_serializes() {
        let body = serde_json::to_value(InteractionResponse::pong()).unwrap();
        assert_eq!(body, json!({ "type": 1 }));
    }

    #[test]
    fn ephemeral_prompt_serializes() {
        let response = InteractionResponse::ephemeral(
            MessageData::default()
                .with_embed(Embed::titled("Title").with_description("Body"))
                .with_row(ActionRow::new(vec![
                    Button::action(ButtonStyle::Success, "Yes", "yes"),
                    Button::link("Claim", "https://example.com"),
                ])),
        );

        let body = serde_json::to_value(response).unwrap();
        assert_eq!(
            body,
            json!({
                "type": 4,
                "data": {
                    "embeds": [{ "title": "Title", "description": "Body" }],
                    "components": [{
                        "type": 1,
                        "components": [
                            { "type": 2, "style": 3, "label": "Yes", "custom_id": "yes" },
                            { "type": 2, "style": 5, "label": "Claim", "url": "https://example.com" }
                        ]
                    }],
                    "flags": 64
                }
            })
        );
    }

    #[test]
    fn text_update_clears_components() {
        let body = serde_json::to_value(InteractionResponse::update(MessageData::text("done"))).unwrap();
        assert_eq!(
            body,
            json!({
                "type": 7,
                "data": { "content": "done", "embeds": [], "components": [] }
            })
        );
    }
}
