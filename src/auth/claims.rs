// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token claims and the authenticated caller derived from them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StoredUser;

/// Authentication method reference carried by every access token.
pub const AMR_APPLICATION: &str = "Application";

/// How far `nbf` is backdated to absorb client clock drift.
pub const NOT_BEFORE_BACKDATE_SECS: i64 = 120;

/// Claims carried by an access token.
///
/// Flags are strings (`"true"` / `"false"`) because the clients parse them
/// that way. `sub` and `device` are optional on decode so a token missing
/// them is reported as a broken issuance rather than a malformed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub nbf: i64,
    pub iss: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub premium: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: String,
    #[serde(default)]
    pub sstamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub amr: Vec<String>,
}

impl AccessClaims {
    /// Claims for `user` signed in on `device_id`.
    pub fn for_session(
        user: &StoredUser,
        device_id: &str,
        scope: &[String],
        issuer: &str,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            nbf: (now - Duration::seconds(NOT_BEFORE_BACKDATE_SECS)).timestamp(),
            iss: issuer.to_string(),
            exp: (now + validity).timestamp(),
            sub: Some(user.id.clone()),
            premium: user.premium.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified.to_string(),
            sstamp: user.security_stamp.clone(),
            device: Some(device_id.to_string()),
            scope: scope.to_vec(),
            amr: vec![AMR_APPLICATION.to_string()],
        }
    }
}

/// Caller identity extracted from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub device_id: String,
    pub email: String,
    pub name: String,
    pub scope: Vec<String>,
    /// Token expiration (Unix seconds)
    pub expires_at: i64,
}
