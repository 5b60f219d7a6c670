// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response shapes of the vault client protocol. Render objects
//! (`*Object`, [`SyncResponse`]) are projections built from stored records on
//! demand and are never persisted.
//!
//! ## Field naming
//!
//! - Responses use PascalCase keys (`Id`, `RevisionDate`, `Object`), except
//!   the OAuth-style token response.
//! - Requests accept the camelCase keys the clients send, their PascalCase
//!   variants, and a few legacy spellings (`organisationId`,
//!   `passwordhistory`, `securenote`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// =============================================================================
// Accounts
// =============================================================================

/// Asymmetric key pair, encrypted client side.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeysRequest {
    #[serde(default, alias = "EncryptedPrivateKey")]
    pub encrypted_private_key: Option<String>,
    #[serde(default, alias = "PublicKey")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "MasterPasswordHash")]
    pub master_password_hash: Option<String>,
    #[serde(default, alias = "MasterPasswordHint")]
    pub master_password_hint: Option<String>,
    /// Wrapped user key
    #[serde(default, alias = "Key")]
    pub key: Option<String>,
    #[serde(default, alias = "Kdf")]
    pub kdf: Option<i32>,
    #[serde(default, alias = "KdfIterations")]
    pub kdf_iterations: Option<i32>,
    #[serde(default, alias = "Keys")]
    pub keys: Option<KeysRequest>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreloginRequest {
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PreloginResponse {
    pub kdf: i32,
    pub kdf_iterations: i32,
}

// =============================================================================
// Identity
// =============================================================================

/// Form body of `POST /identity/connect/token`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Client-side master password hash
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "deviceIdentifier")]
    pub device_identifier: Option<String>,
    #[serde(default, alias = "deviceName")]
    pub device_name: Option<String>,
    #[serde(default, alias = "deviceType")]
    pub device_type: Option<String>,
    #[serde(default, alias = "devicePushToken")]
    pub device_push_token: Option<String>,
}

/// Successful token grant.
///
/// Password logins answer with `expire_in` and `Key`; refreshes answer with
/// `expires_in` and no key. Both spellings are what the clients expect.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub token_type: String,
    pub refresh_token: String,
    #[serde(rename = "Key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl TokenResponse {
    pub fn login(
        access_token: String,
        validity_secs: i64,
        refresh_token: String,
        key: String,
    ) -> Self {
        Self {
            access_token,
            expire_in: Some(validity_secs),
            expires_in: None,
            token_type: "Bearer".to_string(),
            refresh_token,
            key: Some(key),
        }
    }

    pub fn refresh(access_token: String, validity_secs: i64, refresh_token: String) -> Self {
        Self {
            access_token,
            expire_in: None,
            expires_in: Some(validity_secs),
            token_type: "Bearer".to_string(),
            refresh_token,
            key: None,
        }
    }
}

// =============================================================================
// Devices
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenRequest {
    #[serde(default, alias = "PushToken", alias = "pushtoken")]
    pub push_token: Option<String>,
}

// =============================================================================
// Folders
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderRequest {
    /// Encrypted folder name
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FolderObject {
    pub id: String,
    pub name: String,
    pub revision_date: String,
    pub object: String,
}

// =============================================================================
// Ciphers
// =============================================================================

/// Item body sent on create and update. Nested objects stay opaque.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CipherRequest {
    #[serde(default, rename = "type", alias = "Type")]
    pub cipher_type: Option<i32>,
    #[serde(default, alias = "FolderId")]
    pub folder_id: Option<String>,
    #[serde(default, alias = "OrganizationId", alias = "organisationId")]
    pub organization_id: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Notes")]
    #[schema(value_type = Option<Object>)]
    pub notes: Option<Value>,
    #[serde(default, alias = "Fields")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub fields: Option<Vec<Value>>,
    #[serde(default, alias = "Login")]
    #[schema(value_type = Option<Object>)]
    pub login: Option<Value>,
    #[serde(default, alias = "Card")]
    #[schema(value_type = Option<Object>)]
    pub card: Option<Value>,
    #[serde(default, alias = "Identity")]
    #[schema(value_type = Option<Object>)]
    pub identity: Option<Value>,
    #[serde(default, alias = "SecureNote", alias = "securenote")]
    #[schema(value_type = Option<Object>)]
    pub secure_note: Option<Value>,
    #[serde(default, alias = "PasswordHistory", alias = "passwordhistory")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub password_history: Option<Vec<Value>>,
    #[serde(default, alias = "Favorite")]
    pub favorite: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AttachmentObject {
    pub id: String,
    pub url: String,
    pub file_name: String,
    /// Size in bytes, as a decimal string
    pub size: String,
    /// Human-readable size, e.g. `1.2 MiB`
    pub size_name: String,
    pub revision_date: String,
    pub object: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CipherObject {
    pub id: String,
    pub folder_id: Option<String>,
    pub organization_id: Option<String>,
    pub organization_use_totp: bool,
    #[serde(rename = "Type")]
    pub cipher_type: i32,
    pub favorite: bool,
    /// `null` when the item has no attachments
    pub attachments: Option<Vec<AttachmentObject>>,
    pub name: String,
    #[schema(value_type = Option<Object>)]
    pub totp: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub notes: Option<Value>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub fields: Option<Vec<Value>>,
    #[schema(value_type = Option<Object>)]
    pub login: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub card: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub identity: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub secure_note: Option<Value>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub password_history: Option<Vec<Value>>,
    pub revision_date: String,
    pub edit: bool,
    pub object: String,
}

// =============================================================================
// Sync
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileObject {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub premium: bool,
    pub master_password_hint: Option<String>,
    pub culture: String,
    pub two_factor_enabled: bool,
    pub key: String,
    pub private_key: Option<String>,
    pub security_stamp: String,
    #[schema(value_type = Vec<Object>)]
    pub organizations: Vec<Value>,
    pub object: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DomainsObject {
    pub equivalent_domains: Option<Vec<Vec<String>>>,
    pub object: String,
}

impl Default for DomainsObject {
    fn default() -> Self {
        Self {
            equivalent_domains: None,
            object: "domains".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SyncResponse {
    pub profile: ProfileObject,
    pub folders: Vec<FolderObject>,
    pub ciphers: Vec<CipherObject>,
    pub domains: DomainsObject,
    pub object: String,
}
