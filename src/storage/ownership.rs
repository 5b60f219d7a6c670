// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership checks for user-owned records.

use super::{StoredCipher, StoredDevice, StoredFolder};

/// Trait for records that belong to exactly one user.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;

    /// Whether `user_id` owns this record.
    fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_user_id() == user_id
    }
}

impl OwnedResource for StoredFolder {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }
}

impl OwnedResource for StoredCipher {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }
}

impl OwnedResource for StoredDevice {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }
}
