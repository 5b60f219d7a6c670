// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Full vault snapshot for `GET /api/sync`.

use super::{ciphers, folders, VaultError};
use crate::models::{DomainsObject, ProfileObject, SyncResponse};
use crate::storage::{CredentialStore, StoredUser};

pub fn render_profile(user: &StoredUser) -> ProfileObject {
    ProfileObject {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        email_verified: user.email_verified,
        premium: user.premium,
        master_password_hint: user.password_hint.clone(),
        culture: user.culture.clone(),
        two_factor_enabled: false,
        key: user.key.clone(),
        private_key: user.private_key.as_ref().map(|k| k.to_string_lossy()),
        security_stamp: user.security_stamp.clone(),
        organizations: Vec::new(),
        object: "profile".to_string(),
    }
}

/// Profile of the caller.
pub fn profile(store: &dyn CredentialStore, user_id: &str) -> Result<ProfileObject, VaultError> {
    let user = store
        .get_user(user_id)?
        .ok_or_else(|| VaultError::UserNotFound(user_id.to_string()))?;
    Ok(render_profile(&user))
}

/// Profile, folders and items (with attachments) of the caller, in storage
/// order.
pub fn snapshot(
    store: &dyn CredentialStore,
    user_id: &str,
    attachment_base: &str,
) -> Result<SyncResponse, VaultError> {
    let profile = profile(store, user_id)?;

    let folders = store
        .list_folders_by_user(user_id)?
        .iter()
        .map(folders::render)
        .collect();

    let ciphers = store
        .list_ciphers_by_user(user_id)?
        .iter()
        .map(|cipher| ciphers::render_stored(store, cipher, attachment_base))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SyncResponse {
        profile,
        folders,
        ciphers,
        domains: DomainsObject::default(),
        object: "sync".to_string(),
    })
}
