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
    models::{FolderObject, FolderRequest},
    state::AppState,
    vault::folders,
};

#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "Folders",
    security(("bearer" = [])),
    request_body = FolderRequest,
    responses(
        (status = 200, description = "Folder created", body = FolderObject),
        (status = 400, description = "Missing name", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    )
)]
pub async fn create_folder(
    Auth(caller): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FolderRequest>,
) -> Result<Json<FolderObject>, ApiError> {
    let folder = folders::create(state.store.as_ref(), &caller.user_id, &request, Utc::now())?;
    Ok(Json(folders::render(&folder)))
}

#[utoipa::path(
    put,
    path = "/api/folders/{id}",
    tag = "Folders",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Folder id")),
    request_body = FolderRequest,
    responses(
        (status = 200, description = "Folder renamed", body = FolderObject),
        (status = 500, description = "Unknown or foreign folder", body = ErrorBody)
    )
)]
pub async fn update_folder(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    ApiJson(request): ApiJson<FolderRequest>,
) -> Result<Json<FolderObject>, ApiError> {
    let folder = folders::update(
        state.store.as_ref(),
        &caller.user_id,
        &folder_id,
        &request,
        Utc::now(),
    )?;
    Ok(Json(folders::render(&folder)))
}

/// Delete a folder. Items inside it lose their folder reference.
#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    tag = "Folders",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Folder deleted"),
        (status = 500, description = "Unknown or foreign folder", body = ErrorBody)
    )
)]
pub async fn delete_folder(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
) -> Result<(), ApiError> {
    folders::delete(state.store.as_ref(), &caller.user_id, &folder_id)?;
    Ok(())
}
