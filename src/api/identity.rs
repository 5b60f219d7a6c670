// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::ApiForm;
use crate::{
    auth::SessionManager,
    error::{ApiError, ErrorBody},
    models::{TokenRequest, TokenResponse},
    state::AppState,
};

/// OAuth-style token endpoint.
///
/// `grant_type=password` logs in and registers the device;
/// `grant_type=refresh_token` issues a new access token for a known device.
#[utoipa::path(
    post,
    path = "/identity/connect/token",
    tag = "Identity",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 400, description = "Missing field or unsupported grant", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Device or storage failure", body = ErrorBody)
    )
)]
pub async fn token(
    State(state): State<AppState>,
    ApiForm(request): ApiForm<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let sessions = SessionManager::new(state.store.as_ref(), &state.tokens);
    Ok(Json(sessions.grant(&request)?))
}
