// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    error::{ApiError, ErrorBody},
    models::CipherObject,
    state::AppState,
    vault::{
        attachments::{self, Upload},
        ciphers,
    },
};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Multipart upload form. The part's file name is the encrypted file name.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AttachmentUpload {
    #[schema(value_type = String, format = Binary)]
    data: Vec<u8>,
    /// Declared size in bytes; the byte count is used when absent
    size: Option<u64>,
}

/// Collect the `data` file part (and an optional `size` part) of an upload.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file_name = None;
    let mut data = None;
    let mut size = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "Malformed multipart body");
        ApiError::bad_request("Bad data request provided")
    })? {
        match field.name() {
            Some("data") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Bad data request provided"))?;
                data = Some(bytes.to_vec());
            }
            Some("size") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Bad data request provided"))?;
                size = text.trim().parse::<u64>().ok();
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::bad_request("'data' cannot be blank"))?;
    let file_name = file_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("'fileName' cannot be blank"))?;

    Ok(Upload {
        file_name,
        size,
        data,
    })
}

/// Attach a file to an item. Returns the item with its attachments.
#[utoipa::path(
    post,
    path = "/api/ciphers/{id}/attachment",
    tag = "Attachments",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Item id")),
    request_body(content = AttachmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Attachment stored", body = CipherObject),
        (status = 400, description = "Missing file", body = ErrorBody),
        (status = 500, description = "Unknown or foreign item", body = ErrorBody)
    )
)]
pub async fn upload_attachment(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(cipher_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<CipherObject>, ApiError> {
    let store = state.store.as_ref();
    ciphers::owned_cipher(store, &caller.user_id, &cipher_id)?;

    let upload = read_upload(multipart).await?;
    let cipher = attachments::add(store, &cipher_id, upload, Utc::now())?;
    Ok(Json(ciphers::render_stored(
        store,
        &cipher,
        &state.config.attachment_url,
    )?))
}

#[utoipa::path(
    delete,
    path = "/api/ciphers/{id}/attachment/{attachment_id}",
    tag = "Attachments",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Item id"),
        ("attachment_id" = String, Path, description = "Attachment id")
    ),
    responses(
        (status = 200, description = "Attachment deleted"),
        (status = 500, description = "Unknown attachment or foreign item", body = ErrorBody)
    )
)]
pub async fn delete_attachment(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path((cipher_id, attachment_id)): Path<(String, String)>,
) -> Result<(), ApiError> {
    attachments::delete(
        state.store.as_ref(),
        &caller.user_id,
        &cipher_id,
        &attachment_id,
    )?;
    Ok(())
}

/// Raw (client-encrypted) attachment bytes.
#[utoipa::path(
    get,
    path = "/attachments/{item_id}/{attachment_id}",
    tag = "Attachments",
    security(("bearer" = [])),
    params(
        ("item_id" = String, Path, description = "Item id"),
        ("attachment_id" = String, Path, description = "Attachment id")
    ),
    responses(
        (status = 200, description = "Attachment bytes as application/octet-stream"),
        (status = 500, description = "Unknown attachment or foreign item", body = ErrorBody)
    )
)]
pub async fn download_attachment(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path((cipher_id, attachment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, data) = attachments::fetch(
        state.store.as_ref(),
        &caller.user_id,
        &cipher_id,
        &attachment_id,
    )?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}
