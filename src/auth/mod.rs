// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Identity and session management for the vault clients.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials and its device identifier to
//!    `/identity/connect/token`
//! 2. Server reconciles the device row and signs an HS256 access token whose
//!    claims carry the user id (`sub`) and device id (`device`)
//! 3. Client sends `Authorization: Bearer <token>` on every API call
//! 4. The [`Auth`] extractor verifies signature, issuer, expiry and
//!    not-before and hands the handler an [`AuthenticatedUser`]
//! 5. When the access token expires the client exchanges its device's
//!    refresh token for a new one
//!
//! ## Security
//!
//! - Clock skew tolerance is 60 seconds
//! - Login failures never reveal which check failed
//! - Password hashes and admin tokens are compared in constant time

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod session;
pub mod tokens;

pub use claims::{AccessClaims, AuthenticatedUser};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use session::{SessionError, SessionManager, REQUIRED_SCOPE};
pub use tokens::{generate_refresh_token, IssuedToken, TokenIssuer};
