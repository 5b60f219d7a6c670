// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::extract::ApiJson;
use crate::{
    auth::Auth,
    error::{ApiError, ErrorBody},
    models::{CipherObject, CipherRequest},
    state::AppState,
    vault::ciphers,
};

/// Create an item. Any id in the body is ignored.
#[utoipa::path(
    post,
    path = "/api/ciphers",
    tag = "Ciphers",
    security(("bearer" = [])),
    request_body = CipherRequest,
    responses(
        (status = 200, description = "Item created", body = CipherObject),
        (status = 400, description = "Missing type or name", body = ErrorBody),
        (status = 500, description = "Unknown or foreign folder", body = ErrorBody)
    )
)]
pub async fn create_cipher(
    Auth(caller): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CipherRequest>,
) -> Result<Json<CipherObject>, ApiError> {
    let store = state.store.as_ref();
    let cipher = ciphers::create(store, &caller.user_id, &request, Utc::now())?;
    Ok(Json(ciphers::render_stored(
        store,
        &cipher,
        &state.config.attachment_url,
    )?))
}

#[utoipa::path(
    put,
    path = "/api/ciphers/{id}",
    tag = "Ciphers",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Item id")),
    request_body = CipherRequest,
    responses(
        (status = 200, description = "Item replaced", body = CipherObject),
        (status = 400, description = "Missing type or name", body = ErrorBody),
        (status = 500, description = "Unknown or foreign item or folder", body = ErrorBody)
    )
)]
pub async fn update_cipher(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(cipher_id): Path<String>,
    ApiJson(request): ApiJson<CipherRequest>,
) -> Result<Json<CipherObject>, ApiError> {
    let store = state.store.as_ref();
    let cipher = ciphers::update(store, &caller.user_id, &cipher_id, &request, Utc::now())?;
    Ok(Json(ciphers::render_stored(
        store,
        &cipher,
        &state.config.attachment_url,
    )?))
}

/// Delete an item together with its attachments.
#[utoipa::path(
    put,
    path = "/api/ciphers/{id}/delete",
    tag = "Ciphers",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 500, description = "Unknown or foreign item", body = ErrorBody)
    )
)]
pub async fn delete_cipher(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(cipher_id): Path<String>,
) -> Result<(), ApiError> {
    ciphers::delete(state.store.as_ref(), &caller.user_id, &cipher_id)?;
    Ok(())
}
