// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::ServerConfig;
use crate::storage::CredentialStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub config: Arc<ServerConfig>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, config: ServerConfig) -> Self {
        let tokens = TokenIssuer::from_config(&config);
        Self {
            store,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }

    /// State over a fresh in-memory store with a fixed secret and admin token.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let config = ServerConfig::from_lookup(|name| match name {
            crate::config::SECRET_PHRASE_ENV => Some("test-secret".to_string()),
            crate::config::ADMIN_TOKEN_ENV => Some("test-admin-token".to_string()),
            crate::config::STORE_BACKEND_ENV => Some("memory".to_string()),
            _ => None,
        })
        .expect("test configuration is valid");
        Self::new(Arc::new(crate::storage::InMemoryStore::new()), config)
    }
}
