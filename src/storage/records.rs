// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record types.
//!
//! These are the only persisted representations of vault data. Transport
//! shapes live in `crate::models` and are derived from these on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::Blob;

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID v4)
    pub id: String,
    /// Login email, unique and compared case-sensitively
    pub email: String,
    pub name: String,
    /// Client-side master password hash, compared verbatim at login
    pub password_hash: String,
    pub password_hint: Option<String>,
    /// Wrapped user key, opaque to the server
    pub key: String,
    /// Key-derivation function identifier, fixed at registration
    pub kdf: i32,
    /// Key-derivation iteration count, fixed at registration
    pub kdf_iterations: i32,
    pub security_stamp: String,
    pub culture: String,
    pub email_verified: bool,
    pub premium: bool,
    pub public_key: Option<Blob>,
    pub private_key: Option<Blob>,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Build a freshly registered user.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
        password_hint: Option<String>,
        key: impl Into<String>,
        kdf: i32,
        kdf_iterations: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            password_hint,
            key: key.into(),
            kdf,
            kdf_iterations,
            security_stamp: Uuid::new_v4().to_string(),
            culture: "en-US".to_string(),
            email_verified: true,
            premium: true,
            public_key: None,
            private_key: None,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Device
// =============================================================================

/// A client installation, keyed by the identifier the client chose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredDevice {
    /// Client-supplied stable device identifier
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Client device type, stored as sent
    pub device_type: String,
    pub push_token: Option<String>,
    /// Last access token issued to this device
    pub access_token: Option<String>,
    /// Long-lived refresh token, generated once at creation
    pub refresh_token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session state of one (user, device) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Device known, no access token issued yet.
    Unauthenticated,
    Authenticated { expires_at: DateTime<Utc> },
    /// Last access token expired without a refresh.
    Expired { expired_at: DateTime<Utc> },
}

impl StoredDevice {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        device_type: impl Into<String>,
        user_id: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: identifier.into(),
            user_id: user_id.into(),
            name: name.into(),
            device_type: device_type.into(),
            push_token: None,
            access_token: None,
            refresh_token: refresh_token.into(),
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_state(&self, now: DateTime<Utc>) -> SessionState {
        match (&self.access_token, self.token_expires_at) {
            (Some(_), Some(expires_at)) if expires_at > now => {
                SessionState::Authenticated { expires_at }
            }
            (Some(_), Some(expired_at)) => SessionState::Expired { expired_at },
            _ => SessionState::Unauthenticated,
        }
    }
}

// =============================================================================
// Folder
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFolder {
    pub id: String,
    pub user_id: String,
    /// Encrypted folder name, returned verbatim
    pub name: Blob,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cipher
// =============================================================================

/// One encrypted vault item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCipher {
    pub id: String,
    pub user_id: String,
    /// `None` means the item is in no folder
    pub folder_id: Option<String>,
    pub organization_id: Option<String>,
    /// Item type discriminator, stored as sent
    pub cipher_type: i32,
    /// Encrypted item name
    pub name: String,
    pub notes: Option<Blob>,
    pub fields: Option<Blob>,
    pub login: Option<Blob>,
    pub card: Option<Blob>,
    pub identity: Option<Blob>,
    pub secure_note: Option<Blob>,
    pub password_history: Option<Blob>,
    pub favorite: bool,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Attachment
// =============================================================================

/// Attachment metadata. The file bytes are stored separately, keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAttachment {
    pub id: String,
    pub cipher_id: String,
    pub file_name: String,
    /// Size declared at upload, in bytes
    pub size: u64,
    pub updated_at: DateTime<Utc>,
}
