// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require a valid access token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use subtle::ConstantTimeEq;

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Bearer token from the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Extractor for callers holding a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn sync(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<SyncResponse>, ApiError> {
///     // user.user_id and user.device_id come from the token
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = state.tokens.verify(token)?;
        Ok(Auth(user))
    }
}

/// Extractor for the diagnostics routes.
///
/// Requires `Authorization: Bearer <ADMIN_TOKEN>`. When `ADMIN_TOKEN` is not
/// configured every request is refused.
pub struct AdminOnly;

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state
            .config
            .admin_token
            .as_deref()
            .ok_or(AuthError::AdminDisabled)?;
        let supplied = bearer_token(parts)?;

        if !bool::from(expected.as_bytes().ct_eq(supplied.as_bytes())) {
            tracing::warn!("Rejected admin request with wrong token");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly)
    }
}
