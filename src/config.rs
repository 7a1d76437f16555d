// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; the signing key and role are never reloaded.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory for the claims database | `./data` |
//! | `CLAIMS_DB_PATH` | Claims database file | `$DATA_DIR/claims.redb` |
//! | `BOT_TOKEN` | Bot token, used to register slash commands | Optional |
//! | `CLIENT_ID` | Discord application id | Required |
//! | `DISCORD_PUBLIC_KEY` | Application public key (hex) for request verification | Required |
//! | `INTERACTION_MAX_SKEW_SECS` | Accepted age of a signed request timestamp | `300` |
//! | `OG_ROLE_ID` | Role a member needs to claim | Required |
//! | `SIGNER_PRIVATE_KEY` | Stark private key signing claims | Required |
//! | `WEBSITE_URL` | Claim website base URL | Required |
//! | `PENDING_CLAIM_TTL_SECS` | How long a claim waits for confirmation | `900` |
//! | `PENDING_CLAIM_CAPACITY` | Max concurrent pending claims | `10000` |
//! | `PENDING_SWEEP_INTERVAL_SECS` | Expired-claim sweep period | `60` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS with these PEM files | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Directory holding the claims database.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const CLAIMS_DB_PATH_ENV: &str = "CLAIMS_DB_PATH";

pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
pub const DISCORD_PUBLIC_KEY_ENV: &str = "DISCORD_PUBLIC_KEY";
pub const OG_ROLE_ID_ENV: &str = "OG_ROLE_ID";
pub const INTERACTION_MAX_SKEW_ENV: &str = "INTERACTION_MAX_SKEW_SECS";

/// Stark private key (hex or decimal). Never logged.
pub const SIGNER_PRIVATE_KEY_ENV: &str = "SIGNER_PRIVATE_KEY";
pub const WEBSITE_URL_ENV: &str = "WEBSITE_URL";

pub const PENDING_CLAIM_TTL_ENV: &str = "PENDING_CLAIM_TTL_SECS";
pub const PENDING_CLAIM_CAPACITY_ENV: &str = "PENDING_CLAIM_CAPACITY";
pub const PENDING_SWEEP_INTERVAL_ENV: &str = "PENDING_SWEEP_INTERVAL_SECS";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const CLAIMS_DB_FILE: &str = "claims.redb";
const DEFAULT_PENDING_TTL_SECS: u64 = 900;
const DEFAULT_PENDING_CAPACITY: usize = 10_000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_MAX_SKEW_SECS: u64 = 300;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// PEM files for serving HTTPS directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Discord application settings.
#[derive(Clone)]
pub struct DiscordConfig {
    pub application_id: String,
    /// Hex Ed25519 public key
    pub public_key: String,
    /// Only needed to register slash commands
    pub bot_token: Option<String>,
    /// Signed timestamps further than this from now are rejected
    pub max_skew: Duration,
}

/// Fully resolved runtime configuration.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub claims_db_path: PathBuf,
    pub discord: DiscordConfig,
    pub og_role_id: String,
    pub signer_private_key: String,
    pub website_url: Url,
    pub pending_ttl: Duration,
    pub pending_capacity: usize,
    pub sweep_interval: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get(PORT_ENV) {
            Some(raw) => parse(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let claims_db_path = get(CLAIMS_DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(CLAIMS_DB_FILE));

        let website_url = Url::parse(&require(WEBSITE_URL_ENV)?).map_err(|e| ConfigError::Invalid {
            name: WEBSITE_URL_ENV,
            reason: e.to_string(),
        })?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::to_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            claims_db_path,
            discord: DiscordConfig {
                application_id: require(CLIENT_ID_ENV)?,
                public_key: require(DISCORD_PUBLIC_KEY_ENV)?,
                bot_token: get(BOT_TOKEN_ENV),
                max_skew: Duration::from_secs(parse_or(
                    &get,
                    INTERACTION_MAX_SKEW_ENV,
                    DEFAULT_MAX_SKEW_SECS,
                )?),
            },
            og_role_id: require(OG_ROLE_ID_ENV)?,
            signer_private_key: require(SIGNER_PRIVATE_KEY_ENV)?,
            website_url,
            pending_ttl: Duration::from_secs(parse_or(
                &get,
                PENDING_CLAIM_TTL_ENV,
                DEFAULT_PENDING_TTL_SECS,
            )?),
            pending_capacity: parse_or(&get, PENDING_CLAIM_CAPACITY_ENV, DEFAULT_PENDING_CAPACITY)?,
            sweep_interval: Duration::from_secs(parse_or(
                &get,
                PENDING_SWEEP_INTERVAL_ENV,
                DEFAULT_SWEEP_INTERVAL_SECS,
            )?),
            tls,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
    }
}
