// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        AttachmentObject, CipherObject, CipherRequest, DomainsObject, FolderObject, FolderRequest,
        KeysRequest, PreloginRequest, PreloginResponse, ProfileObject, PushTokenRequest,
        RegisterRequest, SyncResponse, TokenRequest, TokenResponse,
    },
    state::AppState,
};

pub mod accounts;
pub mod admin;
pub mod attachments;
pub mod ciphers;
pub mod devices;
pub mod extract;
pub mod folders;
pub mod health;
pub mod identity;
pub mod sync;


pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/accounts/register", post(accounts::register))
        .route("/accounts/prelogin", post(accounts::prelogin))
        .route("/accounts/keys", post(accounts::set_keys))
        .route("/accounts/profile", get(accounts::profile))
        .route("/sync", get(sync::sync))
        .route("/ciphers", post(ciphers::create_cipher))
        .route("/ciphers/{id}", put(ciphers::update_cipher))
        .route("/ciphers/{id}/delete", put(ciphers::delete_cipher))
        .route(
            "/ciphers/{id}/attachment",
            post(attachments::upload_attachment)
                .layer(DefaultBodyLimit::max(attachments::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/ciphers/{id}/attachment/{attachment_id}",
            delete(attachments::delete_attachment),
        )
        .route("/folders", post(folders::create_folder))
        .route(
            "/folders/{id}",
            put(folders::update_folder).delete(folders::delete_folder),
        )
        .route(
            "/devices/identifier/{id}/token",
            put(devices::update_push_token),
        )
        .route(
            "/devices/identifier/{id}/clear-token",
            put(devices::clear_push_token),
        );

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/devices", get(admin::list_devices))
        .route("/folders", get(admin::list_folders))
        .route("/ciphers", get(admin::list_ciphers));

    let app = Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .route("/identity/connect/token", post(identity::token))
        .route(
            "/attachments/{item_id}/{attachment_id}",
            get(attachments::download_attachment),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    app.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Registers the bearer schemes referenced by the handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::register,
        accounts::prelogin,
        accounts::set_keys,
        accounts::profile,
        identity::token,
        sync::sync,
        ciphers::create_cipher,
        ciphers::update_cipher,
        ciphers::delete_cipher,
        folders::create_folder,
        folders::update_folder,
        folders::delete_folder,
        devices::update_push_token,
        devices::clear_push_token,
        attachments::upload_attachment,
        attachments::delete_attachment,
        attachments::download_attachment,
        admin::list_users,
        admin::list_devices,
        admin::list_folders,
        admin::list_ciphers,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            ErrorBody,
            RegisterRequest,
            KeysRequest,
            PreloginRequest,
            PreloginResponse,
            TokenRequest,
            TokenResponse,
            PushTokenRequest,
            FolderRequest,
            FolderObject,
            CipherRequest,
            CipherObject,
            AttachmentObject,
            ProfileObject,
            DomainsObject,
            SyncResponse,
            attachments::AttachmentUpload,
            admin::AdminUserView,
            admin::AdminDeviceView,
            admin::AdminFolderView,
            admin::AdminCipherView,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Registration, prelogin and keys"),
        (name = "Identity", description = "Login and token refresh"),
        (name = "Vault", description = "Full vault synchronization"),
        (name = "Ciphers", description = "Vault item management"),
        (name = "Folders", description = "Folder management"),
        (name = "Devices", description = "Push token maintenance"),
        (name = "Attachments", description = "Encrypted file attachments"),
        (name = "Admin", description = "Diagnostic listings (admin token)"),
        (name = "Health", description = "Liveness and store checks")
    )
)]
struct ApiDoc;
