// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Push token maintenance.
//!
//! The device is always the one bound to the caller's access token. The
//! identifier in the path is accepted for client compatibility only.

use axum::extract::{Path, State};

use super::extract::ApiJson;
use crate::{
    auth::{Auth, SessionManager},
    error::{ApiError, ErrorBody},
    models::PushTokenRequest,
    state::AppState,
};

#[utoipa::path(
    put,
    path = "/api/devices/identifier/{id}/token",
    tag = "Devices",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Device identifier (ignored)")),
    request_body = PushTokenRequest,
    responses(
        (status = 200, description = "Push token stored"),
        (status = 500, description = "Device lookup or write failed", body = ErrorBody)
    )
)]
pub async fn update_push_token(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(_identifier): Path<String>,
    ApiJson(request): ApiJson<PushTokenRequest>,
) -> Result<(), ApiError> {
    let push_token = request.push_token.filter(|t| !t.is_empty());
    SessionManager::new(state.store.as_ref(), &state.tokens)
        .update_push_token(&caller.device_id, push_token)?;
    Ok(())
}

#[utoipa::path(
    put,
    path = "/api/devices/identifier/{id}/clear-token",
    tag = "Devices",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Device identifier (ignored)")),
    responses(
        (status = 200, description = "Push token cleared"),
        (status = 500, description = "Device lookup or write failed", body = ErrorBody)
    )
)]
pub async fn clear_push_token(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(_identifier): Path<String>,
) -> Result<(), ApiError> {
    SessionManager::new(state.store.as_ref(), &state.tokens).clear_push_token(&caller.device_id)?;
    Ok(())
}
