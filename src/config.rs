// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into a
//! [`ServerConfig`] that lives in `AppState` for the rest of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `DATA_DIR` | Directory holding the redb database | `./data` |
//! | `STORE_BACKEND` | `redb` or `memory` | `redb` |
//! | `WARDEN_SECRET_PHRASE` | HS256 signing secret for access tokens | Random per start |
//! | `WARDEN_IDENTITY_URL` | Access token issuer (`iss`) | `/identity` |
//! | `WARDEN_ATTACHMENT_URL` | Base of attachment download URLs | `/attachments` |
//! | `TOKEN_VALIDITY_SECS` | Access token lifetime in seconds | `3600` |
//! | `ADMIN_TOKEN` | Bearer token for `/admin/*` | Unset (admin disabled) |
//! | `TLS_CERT_PATH` | PEM certificate chain | Unset (plain HTTP) |
//! | `TLS_KEY_PATH` | PEM private key | Unset (plain HTTP) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

use base64ct::{Base64UrlUnpadded, Encoding};
use ring::rand::{SecureRandom, SystemRandom};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const STORE_BACKEND_ENV: &str = "STORE_BACKEND";

/// Signing secret for access tokens.
///
/// When unset a random secret is generated at startup, so every restart
/// invalidates all outstanding access tokens (refresh tokens keep working).
pub const SECRET_PHRASE_ENV: &str = "WARDEN_SECRET_PHRASE";

pub const IDENTITY_URL_ENV: &str = "WARDEN_IDENTITY_URL";
pub const ATTACHMENT_URL_ENV: &str = "WARDEN_ATTACHMENT_URL";
pub const TOKEN_VALIDITY_ENV: &str = "TOKEN_VALIDITY_SECS";
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_IDENTITY_URL: &str = "/identity";
pub const DEFAULT_ATTACHMENT_URL: &str = "/attachments";
pub const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 3600;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,

    #[error("failed to generate a random signing secret")]
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub secret_phrase: String,
    /// Set when no secret was configured and one was generated.
    pub secret_generated: bool,
    pub identity_url: String,
    pub attachment_url: String,
    pub token_validity_secs: i64,
    pub admin_token: Option<String>,
    pub tls: Option<TlsPaths>,
    pub json_logs: bool,
}

// Secrets stay out of Debug output
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("store_backend", &self.store_backend)
            .field("identity_url", &self.identity_url)
            .field("attachment_url", &self.attachment_url)
            .field("token_validity_secs", &self.token_validity_secs)
            .field("admin_enabled", &self.admin_token.is_some())
            .field("tls", &self.tls)
            .field("json_logs", &self.json_logs)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let store_backend = match get(STORE_BACKEND_ENV).as_deref() {
            None | Some("redb") => StoreBackend::Redb,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: STORE_BACKEND_ENV,
                    value: other.to_string(),
                })
            }
        };

        let token_validity_secs = match get(TOKEN_VALIDITY_ENV) {
            Some(value) => match value.parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_VALIDITY_ENV,
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_VALIDITY_SECS,
        };

        let (secret_phrase, secret_generated) = match get(SECRET_PHRASE_ENV) {
            Some(secret) => (secret, false),
            None => (generate_secret()?, true),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: get(DATA_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            store_backend,
            secret_phrase,
            secret_generated,
            identity_url: get(IDENTITY_URL_ENV).unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string()),
            attachment_url: get(ATTACHMENT_URL_ENV)
                .unwrap_or_else(|| DEFAULT_ATTACHMENT_URL.to_string()),
            token_validity_secs,
            admin_token: get(ADMIN_TOKEN_ENV),
            tls,
            json_logs: get(LOG_FORMAT_ENV).is_some_and(|format| format == "json"),
        })
    }
}

fn generate_secret() -> Result<String, ConfigError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| ConfigError::Random)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
