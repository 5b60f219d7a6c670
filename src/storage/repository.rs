// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The credential store interface.
//!
//! Every component reads and writes vault data through this trait; the
//! adapters in `database.rs` (redb) and `memory.rs` implement it.
//!
//! ## Contract
//!
//! - `get_*` and `find_*` return `Ok(None)` for a missing row. `Err` always
//!   means the backend failed.
//! - `update_*` and `delete_*` of a missing row return
//!   [`StorageError::NotFound`](super::StorageError::NotFound).
//! - `insert_*` of an existing id (or an email already in use) returns
//!   [`StorageError::AlreadyExists`](super::StorageError::AlreadyExists).
//! - `delete_folder` clears the folder reference of every item in it before
//!   the folder row goes away. `delete_cipher` removes every attachment of the
//!   item before the item row goes away. A failure part way never leaves an
//!   item pointing at a deleted folder or an attachment pointing at a deleted
//!   item.
//! - `list_*` return rows in storage order.

use super::{
    StorageResult, StoredAttachment, StoredCipher, StoredDevice, StoredFolder, StoredUser,
};

pub trait CredentialStore: Send + Sync {
    // ========== Users ==========

    fn list_users(&self) -> StorageResult<Vec<StoredUser>>;

    fn get_user(&self, user_id: &str) -> StorageResult<Option<StoredUser>>;

    /// Exact, case-sensitive email lookup.
    fn find_user_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>>;

    fn insert_user(&self, user: &StoredUser) -> StorageResult<()>;

    fn update_user(&self, user: &StoredUser) -> StorageResult<()>;

    // ========== Devices ==========

    fn list_devices(&self) -> StorageResult<Vec<StoredDevice>>;

    fn get_device(&self, device_id: &str) -> StorageResult<Option<StoredDevice>>;

    fn find_device_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<StoredDevice>>;

    fn list_devices_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredDevice>>;

    fn insert_device(&self, device: &StoredDevice) -> StorageResult<()>;

    fn update_device(&self, device: &StoredDevice) -> StorageResult<()>;

    // ========== Folders ==========

    fn list_folders(&self) -> StorageResult<Vec<StoredFolder>>;

    fn get_folder(&self, folder_id: &str) -> StorageResult<Option<StoredFolder>>;

    fn list_folders_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredFolder>>;

    fn insert_folder(&self, folder: &StoredFolder) -> StorageResult<()>;

    fn update_folder(&self, folder: &StoredFolder) -> StorageResult<()>;

    /// Clear the folder reference of every item in the folder, then remove it.
    fn delete_folder(&self, folder_id: &str) -> StorageResult<()>;

    // ========== Ciphers ==========

    fn list_ciphers(&self) -> StorageResult<Vec<StoredCipher>>;

    fn get_cipher(&self, cipher_id: &str) -> StorageResult<Option<StoredCipher>>;

    fn list_ciphers_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredCipher>>;

    fn list_ciphers_by_folder(&self, folder_id: &str) -> StorageResult<Vec<StoredCipher>>;

    fn insert_cipher(&self, cipher: &StoredCipher) -> StorageResult<()>;

    fn update_cipher(&self, cipher: &StoredCipher) -> StorageResult<()>;

    /// Remove every attachment of the item, then the item itself.
    fn delete_cipher(&self, cipher_id: &str) -> StorageResult<()>;

    // ========== Attachments ==========

    fn get_attachment(&self, attachment_id: &str) -> StorageResult<Option<StoredAttachment>>;

    /// File bytes of an attachment.
    fn read_attachment_data(&self, attachment_id: &str) -> StorageResult<Option<Vec<u8>>>;

    fn list_attachments_by_cipher(&self, cipher_id: &str)
        -> StorageResult<Vec<StoredAttachment>>;

    fn insert_attachment(&self, attachment: &StoredAttachment, data: &[u8]) -> StorageResult<()>;

    fn delete_attachment(&self, attachment_id: &str) -> StorageResult<()>;

    // ========== Maintenance ==========

    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> StorageResult<()>;
}
