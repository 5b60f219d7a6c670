// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only diagnostic listings.
//!
//! Every route requires `Authorization: Bearer <ADMIN_TOKEN>`. Views never
//! carry password hashes, wrapped keys or session tokens.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::AdminOnly,
    error::{ApiError, ErrorBody},
    state::AppState,
    storage::{SessionState, StoredCipher, StoredDevice, StoredFolder, StoredUser},
};

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub kdf: i32,
    pub kdf_iterations: i32,
    pub has_key_pair: bool,
    pub created_at: String,
}

impl From<&StoredUser> for AdminUserView {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            kdf: user.kdf,
            kdf_iterations: user.kdf_iterations,
            has_key_pair: user.public_key.is_some() && user.private_key.is_some(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDeviceView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub device_type: String,
    pub has_push_token: bool,
    /// `unauthenticated`, `authenticated` or `expired`
    pub session: String,
    pub token_expires_at: Option<String>,
    pub updated_at: String,
}

impl AdminDeviceView {
    fn new(device: &StoredDevice, now: chrono::DateTime<Utc>) -> Self {
        let session = match device.session_state(now) {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::Expired { .. } => "expired",
        };
        Self {
            id: device.id.clone(),
            user_id: device.user_id.clone(),
            name: device.name.clone(),
            device_type: device.device_type.clone(),
            has_push_token: device.push_token.is_some(),
            session: session.to_string(),
            token_expires_at: device.token_expires_at.map(|t| t.to_rfc3339()),
            updated_at: device.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminFolderView {
    pub id: String,
    pub user_id: String,
    pub updated_at: String,
}

impl From<&StoredFolder> for AdminFolderView {
    fn from(folder: &StoredFolder) -> Self {
        Self {
            id: folder.id.clone(),
            user_id: folder.user_id.clone(),
            updated_at: folder.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminCipherView {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub cipher_type: i32,
    pub favorite: bool,
    pub updated_at: String,
}

impl From<&StoredCipher> for AdminCipherView {
    fn from(cipher: &StoredCipher) -> Self {
        Self {
            id: cipher.id.clone(),
            user_id: cipher.user_id.clone(),
            folder_id: cipher.folder_id.clone(),
            cipher_type: cipher.cipher_type,
            favorite: cipher.favorite,
            updated_at: cipher.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("admin" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<AdminUserView>),
        (status = 403, description = "Wrong admin token", body = ErrorBody),
        (status = 404, description = "Admin API disabled", body = ErrorBody)
    )
)]
pub async fn list_users(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUserView>>, ApiError> {
    let users = state.store.list_users()?;
    Ok(Json(users.iter().map(AdminUserView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/devices",
    tag = "Admin",
    security(("admin" = [])),
    responses(
        (status = 200, description = "All devices with session state", body = Vec<AdminDeviceView>),
        (status = 403, description = "Wrong admin token", body = ErrorBody),
        (status = 404, description = "Admin API disabled", body = ErrorBody)
    )
)]
pub async fn list_devices(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminDeviceView>>, ApiError> {
    let now = Utc::now();
    let devices = state.store.list_devices()?;
    Ok(Json(
        devices.iter().map(|d| AdminDeviceView::new(d, now)).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/folders",
    tag = "Admin",
    security(("admin" = [])),
    responses(
        (status = 200, description = "All folders", body = Vec<AdminFolderView>),
        (status = 403, description = "Wrong admin token", body = ErrorBody),
        (status = 404, description = "Admin API disabled", body = ErrorBody)
    )
)]
pub async fn list_folders(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminFolderView>>, ApiError> {
    let folders = state.store.list_folders()?;
    Ok(Json(folders.iter().map(AdminFolderView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/ciphers",
    tag = "Admin",
    security(("admin" = [])),
    responses(
        (status = 200, description = "All items", body = Vec<AdminCipherView>),
        (status = 403, description = "Wrong admin token", body = ErrorBody),
        (status = 404, description = "Admin API disabled", body = ErrorBody)
    )
)]
pub async fn list_ciphers(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminCipherView>>, ApiError> {
    let ciphers = state.store.list_ciphers()?;
    Ok(Json(ciphers.iter().map(AdminCipherView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn device_view_reports_session_state() {
        let now = Utc::now();
        let mut device = StoredDevice::new("dev-1", "cli", "8", "user-1", "refresh");
        assert_eq!(AdminDeviceView::new(&device, now).session, "unauthenticated");

        device.access_token = Some("token".to_string());
        device.token_expires_at = Some(now + Duration::hours(1));
        assert_eq!(AdminDeviceView::new(&device, now).session, "authenticated");

        device.token_expires_at = Some(now - Duration::hours(1));
        let view = AdminDeviceView::new(&device, now);
        assert_eq!(view.session, "expired");
        assert!(!view.has_push_token);
    }

    #[test]
    fn user_view_hides_secrets() {
        let user = StoredUser::new("alice@example.com", "Alice", "hash", Some("hint".into()), "key", 0, 5000);
        let json = serde_json::to_value(AdminUserView::from(&user)).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("key").is_none());
        assert_eq!(json["has_key_pair"], false);
    }
}
