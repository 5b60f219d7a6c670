// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::{ApiError, ErrorBody},
    models::SyncResponse,
    state::AppState,
    vault,
};

/// Full vault snapshot of the caller.
#[utoipa::path(
    get,
    path = "/api/sync",
    tag = "Vault",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile, folders and items", body = SyncResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    )
)]
pub async fn sync(
    Auth(caller): Auth,
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, ApiError> {
    let snapshot = vault::sync::snapshot(
        state.store.as_ref(),
        &caller.user_id,
        &state.config.attachment_url,
    )?;
    tracing::debug!(
        user_id = %caller.user_id,
        folders = snapshot.folders.len(),
        ciphers = snapshot.ciphers.len(),
        "Sync served"
    );
    Ok(Json(snapshot))
}
