// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 access token issuance and verification.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use ring::rand::{SecureRandom, SystemRandom};

use super::{AccessClaims, AuthError, AuthenticatedUser};
use crate::config::ServerConfig;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Random bytes behind each refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens with the configured secret phrase.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, validity_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            validity: Duration::seconds(validity_secs),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.secret_phrase.as_bytes(),
            config.identity_url.clone(),
            config.token_validity_secs,
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn validity_secs(&self) -> i64 {
        self.validity.num_seconds()
    }

    /// Sign `claims`. Expiry is read back from the claims.
    pub fn sign(&self, claims: &AccessClaims) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or_else(|| Utc::now() + self.validity);
        Ok(IssuedToken { token, expires_at })
    }

    /// Validate signature, issuer, expiry and not-before, then extract the caller.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            })?;

        let claims = token_data.claims;
        let (Some(user_id), Some(device_id)) = (claims.sub, claims.device) else {
            tracing::error!("Validly signed access token without subject or device");
            return Err(AuthError::MissingSubject);
        };

        Ok(AuthenticatedUser {
            user_id,
            device_id,
            email: claims.email,
            name: claims.name,
            scope: claims.scope,
            expires_at: claims.exp,
        })
    }
}

/// Fresh URL-safe refresh token.
pub fn generate_refresh_token() -> Result<String, ring::error::Unspecified> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    SystemRandom::new().fill(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoredUser;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", "/identity", 3600)
    }

    fn claims(now: DateTime<Utc>) -> AccessClaims {
        let user = StoredUser::new("alice@example.com", "Alice", "hash", None, "key", 0, 5000);
        AccessClaims::for_session(
            &user,
            "dev-1",
            &["api".to_string(), "offline_access".to_string()],
            "/identity",
            now,
            Duration::hours(1),
        )
    }

    #[test]
    fn signed_token_verifies() {
        let issuer = issuer();
        let issued = issuer.sign(&claims(Utc::now())).unwrap();
        let user = issuer.verify(&issued.token).unwrap();
        assert_eq!(user.device_id, "dev-1");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.scope, vec!["api", "offline_access"]);
        assert_eq!(user.expires_at, issued.expires_at.timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issued = issuer().sign(&claims(Utc::now())).unwrap();
        let other = TokenIssuer::new(b"other-secret", "/identity", 3600);
        assert!(matches!(
            other.verify(&issued.token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let issued = issuer().sign(&claims(Utc::now())).unwrap();
        let other = TokenIssuer::new(b"test-secret", "https://elsewhere/identity", 3600);
        assert!(matches!(other.verify(&issued.token), Err(AuthError::InvalidIssuer)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = issuer()
            .sign(&claims(Utc::now() - Duration::hours(3)))
            .unwrap();
        assert!(matches!(
            issuer().verify(&issued.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            issuer().verify("not-a-jwt"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn token_without_subject_is_a_broken_issuance() {
        let mut claims = claims(Utc::now());
        claims.sub = None;
        let issued = issuer().sign(&claims).unwrap();
        assert!(matches!(
            issuer().verify(&issued.token),
            Err(AuthError::MissingSubject)
        ));
    }

    #[test]
    fn refresh_tokens_are_url_safe_and_unique() {
        let a = generate_refresh_token().unwrap();
        let b = generate_refresh_token().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
