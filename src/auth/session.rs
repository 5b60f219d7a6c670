// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, refresh and device reconciliation.
//!
//! ## Password grant
//!
//! 1. Required fields and the exact `api offline_access` scope are checked.
//! 2. The user is looked up by email and the master password hash compared.
//! 3. The device is created (first login from this identifier) or updated in
//!    place. A device registered to another user is refused.
//! 4. An access token is signed, then persisted on the re-read device.
//!
//! Every authentication failure surfaces as the same generic 401; the
//! specific reason is only logged. A device write failure aborts the login
//! before any token leaves the server.

use chrono::{DateTime, Utc};

use super::{generate_refresh_token, password::verify_password, AccessClaims, TokenIssuer};
use crate::error::{ApiError, STORAGE_FAILED_MESSAGE};
use crate::models::{TokenRequest, TokenResponse};
use crate::storage::{CredentialStore, OwnedResource, StorageError, StoredDevice, StoredUser};

/// The only scope clients may request.
pub const REQUIRED_SCOPE: &str = "api offline_access";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("'{0}' cannot be blank")]
    MissingField(&'static str),

    #[error("grant_type should be 'password' or 'refresh_token'")]
    UnsupportedGrant,

    #[error("unsupported scope")]
    InvalidScope,

    #[error("unknown user")]
    UnknownUser,

    #[error("password hash mismatch")]
    WrongPassword,

    #[error("device {0} belongs to another user")]
    DeviceOwnedByOther(String),

    #[error("unknown refresh token")]
    UnknownRefreshToken,

    #[error("device {0} not found")]
    DeviceNotFound(String),

    #[error("device {0} vanished during login")]
    DeviceVanished(String),

    #[error("device write failed: {0}")]
    DeviceWrite(StorageError),

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("random generator failure")]
    Random,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::MissingField(_) | SessionError::UnsupportedGrant => {
                ApiError::bad_request(error.to_string())
            }
            SessionError::InvalidScope
            | SessionError::UnknownUser
            | SessionError::WrongPassword
            | SessionError::DeviceOwnedByOther(_)
            | SessionError::UnknownRefreshToken => {
                tracing::info!(reason = %error, "Authentication failed");
                ApiError::unauthorized()
            }
            SessionError::DeviceNotFound(_) => {
                tracing::warn!(error = %error, "Push token update for unknown device");
                ApiError::internal("Failed to get data for the device")
            }
            SessionError::DeviceWrite(_) => {
                tracing::error!(error = %error, "Device update failed");
                ApiError::internal("Failed to update device")
            }
            SessionError::DeviceVanished(_)
            | SessionError::Signing(_)
            | SessionError::Random
            | SessionError::Storage(_) => {
                tracing::error!(error = %error, "Session failure");
                ApiError::internal(STORAGE_FAILED_MESSAGE)
            }
        }
    }
}

/// Session operations over a credential store.
pub struct SessionManager<'a> {
    store: &'a dyn CredentialStore,
    tokens: &'a TokenIssuer,
}

fn required<'r>(value: &'r Option<String>, name: &'static str) -> Result<&'r str, SessionError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(SessionError::MissingField(name))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

impl<'a> SessionManager<'a> {
    pub fn new(store: &'a dyn CredentialStore, tokens: &'a TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Dispatch on `grant_type`.
    pub fn grant(&self, request: &TokenRequest) -> Result<TokenResponse, SessionError> {
        match request.grant_type.as_deref() {
            Some("password") => self.password_grant(request, Utc::now()),
            Some("refresh_token") => self.refresh_grant(request.refresh_token.as_deref(), Utc::now()),
            _ => Err(SessionError::UnsupportedGrant),
        }
    }

    pub fn password_grant(
        &self,
        request: &TokenRequest,
        now: DateTime<Utc>,
    ) -> Result<TokenResponse, SessionError> {
        let username = required(&request.username, "username")?;
        let password = required(&request.password, "password")?;
        let device_identifier = required(&request.device_identifier, "deviceIdentifier")?;

        let scope = request.scope.as_deref().unwrap_or_default();
        if scope != REQUIRED_SCOPE {
            return Err(SessionError::InvalidScope);
        }

        let user = self
            .store
            .find_user_by_email(username)?
            .ok_or(SessionError::UnknownUser)?;
        if !verify_password(&user.password_hash, password) {
            return Err(SessionError::WrongPassword);
        }

        let device_id = self.reconcile_device(&user, device_identifier, request, now)?;
        let scope: Vec<String> = scope.split(' ').map(str::to_string).collect();
        let (access_token, refresh_token) = self.issue(&user, &device_id, &scope, now)?;

        tracing::info!(user_id = %user.id, device_id = %device_id, "Password login succeeded");
        Ok(TokenResponse::login(
            access_token,
            self.tokens.validity_secs(),
            refresh_token,
            user.key,
        ))
    }

    pub fn refresh_grant(
        &self,
        refresh_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TokenResponse, SessionError> {
        let refresh_token = refresh_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(SessionError::MissingField("refresh_token"))?;

        let device = self
            .store
            .find_device_by_refresh_token(refresh_token)?
            .ok_or(SessionError::UnknownRefreshToken)?;
        let user = self
            .store
            .get_user(&device.user_id)?
            .ok_or(SessionError::UnknownUser)?;

        let scope: Vec<String> = REQUIRED_SCOPE.split(' ').map(str::to_string).collect();
        let (access_token, refresh_token) = self.issue(&user, &device.id, &scope, now)?;

        tracing::info!(user_id = %user.id, device_id = %device.id, "Access token refreshed");
        Ok(TokenResponse::refresh(
            access_token,
            self.tokens.validity_secs(),
            refresh_token,
        ))
    }

    /// Create or update the device row for this login. Returns its id.
    fn reconcile_device(
        &self,
        user: &StoredUser,
        identifier: &str,
        request: &TokenRequest,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let name = request.device_name.clone().unwrap_or_default();
        let device_type = request.device_type.clone().unwrap_or_default();
        let push_token = non_empty(&request.device_push_token);

        match self.store.get_device(identifier)? {
            Some(mut device) => {
                if !device.is_owned_by(&user.id) {
                    tracing::warn!(
                        device_id = %identifier,
                        user_id = %user.id,
                        "Device identifier already registered to another user"
                    );
                    return Err(SessionError::DeviceOwnedByOther(identifier.to_string()));
                }
                device.name = name;
                device.device_type = device_type;
                if push_token.is_some() {
                    device.push_token = push_token;
                }
                device.updated_at = now;
                self.store
                    .update_device(&device)
                    .map_err(SessionError::DeviceWrite)?;
                Ok(device.id)
            }
            None => {
                let refresh_token = generate_refresh_token().map_err(|_| SessionError::Random)?;
                let mut device =
                    StoredDevice::new(identifier, name, device_type, &user.id, refresh_token);
                device.push_token = push_token;
                self.store
                    .insert_device(&device)
                    .map_err(SessionError::DeviceWrite)?;
                tracing::info!(device_id = %device.id, user_id = %user.id, "Registered new device");
                Ok(device.id)
            }
        }
    }

    /// Sign an access token and persist it on the device.
    ///
    /// Returns the access token and the device's refresh token.
    fn issue(
        &self,
        user: &StoredUser,
        device_id: &str,
        scope: &[String],
        now: DateTime<Utc>,
    ) -> Result<(String, String), SessionError> {
        let claims = AccessClaims::for_session(
            user,
            device_id,
            scope,
            self.tokens.issuer(),
            now,
            self.tokens.validity(),
        );
        let issued = self.tokens.sign(&claims)?;

        let mut device = self
            .store
            .get_device(device_id)?
            .ok_or_else(|| SessionError::DeviceVanished(device_id.to_string()))?;
        device.access_token = Some(issued.token.clone());
        device.token_expires_at = Some(issued.expires_at);
        device.updated_at = now;
        self.store
            .update_device(&device)
            .map_err(SessionError::DeviceWrite)?;

        Ok((issued.token, device.refresh_token))
    }

    pub fn clear_push_token(&self, device_id: &str) -> Result<(), SessionError> {
        self.set_push_token(device_id, None)
    }

    pub fn update_push_token(
        &self,
        device_id: &str,
        push_token: Option<String>,
    ) -> Result<(), SessionError> {
        self.set_push_token(device_id, push_token)
    }

    fn set_push_token(&self, device_id: &str, push_token: Option<String>) -> Result<(), SessionError> {
        let mut device = self
            .store
            .get_device(device_id)?
            .ok_or_else(|| SessionError::DeviceNotFound(device_id.to_string()))?;
        device.push_token = push_token;
        device.updated_at = Utc::now();
        self.store
            .update_device(&device)
            .map_err(SessionError::DeviceWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LOGIN_FAILED_MESSAGE;
    use crate::storage::{InMemoryStore, SessionState};

    fn setup() -> (InMemoryStore, TokenIssuer, StoredUser) {
        let store = InMemoryStore::new();
        let user = StoredUser::new(
            "alice@example.com",
            "Alice",
            "master-hash",
            None,
            "2.wrapped-key",
            0,
            100_000,
        );
        store.insert_user(&user).unwrap();
        (store, TokenIssuer::new(b"secret", "/identity", 3600), user)
    }

    fn login_request(device: &str) -> TokenRequest {
        TokenRequest {
            grant_type: Some("password".to_string()),
            client_id: Some("web".to_string()),
            username: Some("alice@example.com".to_string()),
            password: Some("master-hash".to_string()),
            scope: Some(REQUIRED_SCOPE.to_string()),
            device_identifier: Some(device.to_string()),
            device_name: Some("firefox".to_string()),
            device_type: Some("3".to_string()),
            ..TokenRequest::default()
        }
    }

    #[test]
    fn login_creates_device_and_persists_token() {
        let (store, tokens, user) = setup();
        let sessions = SessionManager::new(&store, &tokens);
        let now = Utc::now();

        let response = sessions.password_grant(&login_request("dev-1"), now).unwrap();
        assert_eq!(response.expire_in, Some(3600));
        assert_eq!(response.key.as_deref(), Some("2.wrapped-key"));

        let device = store.get_device("dev-1").unwrap().expect("device created");
        assert_eq!(device.user_id, user.id);
        assert_eq!(device.refresh_token, response.refresh_token);
        assert_eq!(device.access_token.as_deref(), Some(response.access_token.as_str()));
        assert!(matches!(
            device.session_state(now),
            SessionState::Authenticated { .. }
        ));

        let caller = tokens.verify(&response.access_token).unwrap();
        assert_eq!(caller.user_id, user.id);
        assert_eq!(caller.device_id, "dev-1");
    }

    #[test]
    fn second_login_updates_device_in_place() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);

        let mut first = login_request("dev-1");
        first.device_push_token = Some("push-1".to_string());
        let first_response = sessions.password_grant(&first, Utc::now()).unwrap();

        let mut second = login_request("dev-1");
        second.device_name = Some("chrome".to_string());
        second.device_type = Some("2".to_string());
        let second_response = sessions.password_grant(&second, Utc::now()).unwrap();

        let devices = store.list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "chrome");
        assert_eq!(devices[0].device_type, "2");
        assert_eq!(devices[0].push_token.as_deref(), Some("push-1"));
        assert_eq!(first_response.refresh_token, second_response.refresh_token);
    }

    #[test]
    fn failures_are_indistinguishable() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);

        let mut wrong_password = login_request("dev-1");
        wrong_password.password = Some("nope".to_string());
        let mut unknown_user = login_request("dev-1");
        unknown_user.username = Some("bob@example.com".to_string());
        let mut wrong_scope = login_request("dev-1");
        wrong_scope.scope = Some("api".to_string());

        for request in [wrong_password, unknown_user, wrong_scope] {
            let error: ApiError = sessions
                .password_grant(&request, Utc::now())
                .unwrap_err()
                .into();
            assert_eq!(error.status, axum::http::StatusCode::UNAUTHORIZED);
            assert_eq!(error.message, LOGIN_FAILED_MESSAGE);
        }
        assert!(store.list_devices().unwrap().is_empty());
    }

    #[test]
    fn missing_fields_are_client_errors() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);

        let mut request = login_request("dev-1");
        request.device_identifier = None;
        assert!(matches!(
            sessions.password_grant(&request, Utc::now()),
            Err(SessionError::MissingField("deviceIdentifier"))
        ));

        let mut request = login_request("dev-1");
        request.username = Some(String::new());
        assert!(matches!(
            sessions.password_grant(&request, Utc::now()),
            Err(SessionError::MissingField("username"))
        ));
    }

    #[test]
    fn device_of_another_user_is_refused() {
        let (store, tokens, _) = setup();
        store
            .insert_device(&StoredDevice::new("dev-1", "cli", "8", "someone-else", "r-1"))
            .unwrap();
        let sessions = SessionManager::new(&store, &tokens);

        assert!(matches!(
            sessions.password_grant(&login_request("dev-1"), Utc::now()),
            Err(SessionError::DeviceOwnedByOther(_))
        ));
        let device = store.get_device("dev-1").unwrap().unwrap();
        assert_eq!(device.user_id, "someone-else");
        assert!(device.access_token.is_none());
    }

    #[test]
    fn device_write_failure_aborts_login() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);
        sessions
            .password_grant(&login_request("dev-1"), Utc::now())
            .unwrap();
        let before = store.get_device("dev-1").unwrap().unwrap();

        store.fail_device_writes(true);
        let error = sessions
            .password_grant(&login_request("dev-1"), Utc::now())
            .unwrap_err();
        assert!(matches!(error, SessionError::DeviceWrite(_)));
        store.fail_device_writes(false);

        assert_eq!(store.get_device("dev-1").unwrap().unwrap(), before);
    }

    #[test]
    fn refresh_keeps_refresh_token() {
        let (store, tokens, user) = setup();
        let sessions = SessionManager::new(&store, &tokens);
        let login = sessions
            .password_grant(&login_request("dev-1"), Utc::now())
            .unwrap();

        let later = Utc::now() + chrono::Duration::seconds(5);
        let refreshed = sessions
            .refresh_grant(Some(&login.refresh_token), later)
            .unwrap();
        assert_eq!(refreshed.refresh_token, login.refresh_token);
        assert_eq!(refreshed.expires_in, Some(3600));
        assert!(refreshed.key.is_none());
        assert_ne!(refreshed.access_token, login.access_token);

        let device = store.get_device("dev-1").unwrap().unwrap();
        assert_eq!(
            device.access_token.as_deref(),
            Some(refreshed.access_token.as_str())
        );
        assert_eq!(tokens.verify(&refreshed.access_token).unwrap().user_id, user.id);
    }

    #[test]
    fn refresh_rejects_blank_and_unknown_tokens() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);
        assert!(matches!(
            sessions.refresh_grant(Some("  "), Utc::now()),
            Err(SessionError::MissingField("refresh_token"))
        ));
        assert!(matches!(
            sessions.refresh_grant(None, Utc::now()),
            Err(SessionError::MissingField("refresh_token"))
        ));
        assert!(matches!(
            sessions.refresh_grant(Some("unknown"), Utc::now()),
            Err(SessionError::UnknownRefreshToken)
        ));
    }

    #[test]
    fn unsupported_grant_type() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);
        let mut request = login_request("dev-1");
        request.grant_type = Some("client_credentials".to_string());
        let error: ApiError = sessions.grant(&request).unwrap_err().into();
        assert_eq!(error.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(
            error.message,
            "grant_type should be 'password' or 'refresh_token'"
        );
    }

    #[test]
    fn push_token_clear_and_update() {
        let (store, tokens, _) = setup();
        let sessions = SessionManager::new(&store, &tokens);
        sessions
            .password_grant(&login_request("dev-1"), Utc::now())
            .unwrap();

        sessions
            .update_push_token("dev-1", Some("push-9".to_string()))
            .unwrap();
        assert_eq!(
            store.get_device("dev-1").unwrap().unwrap().push_token.as_deref(),
            Some("push-9")
        );

        sessions.clear_push_token("dev-1").unwrap();
        assert!(store.get_device("dev-1").unwrap().unwrap().push_token.is_none());

        assert!(matches!(
            sessions.clear_push_token("ghost"),
            Err(SessionError::DeviceNotFound(_))
        ));
    }
}
