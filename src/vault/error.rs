// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::error::{ApiError, STORAGE_FAILED_MESSAGE};
use crate::storage::StorageError;

/// Errors of vault operations.
///
/// Ownership violations and missing records are answered with a 500 and a
/// generic message; the specific reason is logged.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("'{0}' cannot be blank")]
    MissingField(&'static str),

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("folder {0} not found")]
    FolderNotFound(String),

    #[error("folder {0} belongs to another user")]
    FolderOwnedByOther(String),

    #[error("cipher {0} not found")]
    CipherNotFound(String),

    #[error("cipher {0} belongs to another user")]
    CipherOwnedByOther(String),

    #[error("attachment {0} not found")]
    AttachmentNotFound(String),

    #[error("attachment {0} is not part of the requested cipher")]
    AttachmentMismatch(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl VaultError {
    /// Message shown to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            VaultError::MissingField(_) => "Bad data request provided",
            VaultError::UserNotFound(_) => "JWT fail to reach user",
            VaultError::FolderNotFound(_) => "Database failed to find a folder for this id",
            VaultError::FolderOwnedByOther(_) => "Invalid folder",
            VaultError::CipherNotFound(_) => "Failed to get the designed cipher",
            VaultError::CipherOwnedByOther(_) => "Invalid cipher",
            VaultError::AttachmentNotFound(_) => "Failed to get the designed attachment",
            VaultError::AttachmentMismatch(_) => "Invalid attachment",
            VaultError::Storage(_) => STORAGE_FAILED_MESSAGE,
        }
    }
}

impl From<VaultError> for ApiError {
    fn from(error: VaultError) -> Self {
        match error {
            VaultError::MissingField(_) => ApiError::bad_request(error.to_string()),
            VaultError::Storage(inner) => inner.into(),
            refused => {
                tracing::warn!(reason = %refused, "Vault operation refused");
                ApiError::internal(refused.public_message())
            }
        }
    }
}
