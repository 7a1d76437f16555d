// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Slash command definitions and registration.
//!
//! Registration overwrites the application's global command set with
//! `PUT /applications/{application_id}/commands`, which is idempotent.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

/// Name of the claim slash command.
pub const CLAIM_COMMAND: &str = "claim";
/// Name of the wallet option on the claim command.
pub const WALLET_OPTION: &str = "mainnet-wallet-address";

/// Default Discord REST base URL.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Option type for string arguments.
pub const STRING_OPTION: u8 = 3;

/// Error type for Discord REST calls.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Global application command definition.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOptionDef>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandOptionDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub required: bool,
}

/// The `/claim <mainnet-wallet-address>` command.
pub fn claim_command() -> ApplicationCommand {
    ApplicationCommand {
        name: CLAIM_COMMAND.to_string(),
        description: "Claim your OG domain.".to_string(),
        options: vec![CommandOptionDef {
            name: WALLET_OPTION.to_string(),
            description: "your mainnet wallet address".to_string(),
            kind: STRING_OPTION,
            required: true,
        }],
    }
}

/// Registers slash commands through the Discord REST API.
#[derive(Clone)]
pub struct CommandRegistrar {
    client: reqwest::Client,
    api_base: String,
    application_id: String,
    bot_token: String,
}

impl CommandRegistrar {
    pub fn new(
        application_id: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Result<Self, DiscordError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
            api_base: DISCORD_API_BASE.to_string(),
            application_id: application_id.into(),
            bot_token: bot_token.into(),
        })
    }

    /// Point at a different API base (tests, proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn commands_url(&self) -> String {
        format!(
            "{}/applications/{}/commands",
            self.api_base.trim_end_matches('/'),
            self.application_id
        )
    }

    /// Replace the global command set with `commands`.
    pub async fn register(&self, commands: &[ApplicationCommand]) -> Result<(), DiscordError> {
        info!(count = commands.len(), "Refreshing application (/) commands");

        let response = self
            .client
            .put(self.commands_url())
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.bot_token))
            .json(commands)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscordError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!("Successfully reloaded application (/) commands");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claim_command_payload() {
        let body = serde_json::to_value(vec![claim_command()]).unwrap();
        assert_eq!(
            body,
            json!([{
                "name": "claim",
                "description": "Claim your OG domain.",
                "options": [{
                    "name": "mainnet-wallet-address",
                    "description": "your mainnet wallet address",
                    "type": 3,
                    "required": true
                }]
            }])
        );
    }

    #[test]
    fn commands_url_uses_application_id() {
        let registrar = CommandRegistrar::new("123", "token")
            .unwrap()
            .with_api_base("http://localhost:9000/api/");
        assert_eq!(
            registrar.commands_url(),
            "http://localhost:9000/api/applications/123/commands"
        );
    }
}
