// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints: registration, prelogin, key upload and profile.

use axum::{extract::State, Json};

use super::extract::ApiJson;
use crate::{
    auth::Auth,
    codec::Blob,
    error::{ApiError, ErrorBody},
    models::{KeysRequest, PreloginRequest, PreloginResponse, ProfileObject, RegisterRequest},
    state::AppState,
    storage::{StorageError, StoredUser},
    vault::{self, VaultError},
};

const DUPLICATE_EMAIL_MESSAGE: &str = "A user with this email already exists";
const BAD_DATA_MESSAGE: &str = "Bad data request provided";

fn require(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("'{name}' cannot be blank")))
}

fn apply_keys(user: &mut StoredUser, keys: KeysRequest) {
    if let Some(private_key) = keys.encrypted_private_key.filter(|k| !k.is_empty()) {
        user.private_key = Some(Blob::from(private_key));
    }
    if let Some(public_key) = keys.public_key.filter(|k| !k.is_empty()) {
        user.public_key = Some(Blob::from(public_key));
    }
}

/// Register a new account.
///
/// Key-derivation parameters are fixed here and never renegotiated.
#[utoipa::path(
    post,
    path = "/api/accounts/register",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created"),
        (status = 400, description = "Missing fields or email already registered", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(), ApiError> {
    let email = require(request.email, "email")?;
    let password_hash = require(request.master_password_hash, "masterPasswordHash")?;
    let key = require(request.key, "key")?;
    let kdf_iterations = request
        .kdf_iterations
        .ok_or_else(|| ApiError::bad_request("'kdfIterations' cannot be blank"))?;

    if state.store.find_user_by_email(&email)?.is_some() {
        return Err(ApiError::bad_request(DUPLICATE_EMAIL_MESSAGE));
    }

    let mut user = StoredUser::new(
        email,
        request.name.unwrap_or_default(),
        password_hash,
        request.master_password_hint.filter(|h| !h.is_empty()),
        key,
        request.kdf.unwrap_or(0),
        kdf_iterations,
    );
    if let Some(keys) = request.keys {
        apply_keys(&mut user, keys);
    }

    match state.store.insert_user(&user) {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "Registered new user");
            Ok(())
        }
        // Lost a race with a concurrent registration
        Err(StorageError::AlreadyExists(_)) => Err(ApiError::bad_request(DUPLICATE_EMAIL_MESSAGE)),
        Err(e) => Err(e.into()),
    }
}

/// Key-derivation parameters for an email.
#[utoipa::path(
    post,
    path = "/api/accounts/prelogin",
    tag = "Accounts",
    request_body = PreloginRequest,
    responses(
        (status = 200, description = "KDF parameters", body = PreloginResponse),
        (status = 400, description = "Unknown email", body = ErrorBody)
    )
)]
pub async fn prelogin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PreloginRequest>,
) -> Result<Json<PreloginResponse>, ApiError> {
    let email = request
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request(BAD_DATA_MESSAGE))?;

    let user = state
        .store
        .find_user_by_email(&email)?
        .ok_or_else(|| ApiError::bad_request(BAD_DATA_MESSAGE))?;

    Ok(Json(PreloginResponse {
        kdf: user.kdf,
        kdf_iterations: user.kdf_iterations,
    }))
}

/// Store the caller's encrypted key pair.
#[utoipa::path(
    post,
    path = "/api/accounts/keys",
    tag = "Accounts",
    security(("bearer" = [])),
    request_body = KeysRequest,
    responses(
        (status = 200, description = "Keys stored", body = ProfileObject),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    )
)]
pub async fn set_keys(
    Auth(caller): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<KeysRequest>,
) -> Result<Json<ProfileObject>, ApiError> {
    let mut user = state
        .store
        .get_user(&caller.user_id)?
        .ok_or_else(|| VaultError::UserNotFound(caller.user_id.clone()))?;
    apply_keys(&mut user, request);
    state.store.update_user(&user)?;
    Ok(Json(vault::sync::render_profile(&user)))
}

/// Profile of the caller.
#[utoipa::path(
    get,
    path = "/api/accounts/profile",
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileObject),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    )
)]
pub async fn profile(
    Auth(caller): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileObject>, ApiError> {
    Ok(Json(vault::sync::profile(state.store.as_ref(), &caller.user_id)?))
}
