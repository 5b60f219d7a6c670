// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded credential store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `users_by_email`: email → user_id
//! - `devices`: device identifier → serialized StoredDevice
//! - `devices_by_refresh_token`: refresh token → device identifier
//! - `folders`: folder_id → serialized StoredFolder
//! - `ciphers`: cipher_id → serialized StoredCipher
//! - `attachments`: attachment_id → serialized StoredAttachment
//! - `attachment_data`: attachment_id → file bytes
//!
//! Folder and item deletes run their cascade inside the same write
//! transaction as the parent removal, so either the whole cascade commits or
//! nothing does.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

use super::{
    CredentialStore, StorageError, StorageResult, StoredAttachment, StoredCipher, StoredDevice,
    StoredFolder, StoredUser,
};

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

const DEVICES: TableDefinition<&str, &[u8]> = TableDefinition::new("devices");

const DEVICES_BY_REFRESH_TOKEN: TableDefinition<&str, &str> =
    TableDefinition::new("devices_by_refresh_token");

const FOLDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("folders");

const CIPHERS: TableDefinition<&str, &[u8]> = TableDefinition::new("ciphers");

const ATTACHMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("attachments");

const ATTACHMENT_DATA: TableDefinition<&str, &[u8]> = TableDefinition::new("attachment_data");

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "vault.redb";

// =============================================================================
// Record Helpers
// =============================================================================

fn get_json<T, Tb>(table: &Tb, id: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    Tb: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn scan_json<T, Tb>(table: &Tb, mut keep: impl FnMut(&T) -> bool) -> StorageResult<Vec<T>>
where
    T: DeserializeOwned,
    Tb: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        let record: T = serde_json::from_slice(value.value())?;
        if keep(&record) {
            records.push(record);
        }
    }
    Ok(records)
}

fn put_json<T: Serialize>(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    id: &str,
    record: &T,
) -> StorageResult<()> {
    let json = serde_json::to_vec(record)?;
    table.insert(id, json.as_slice())?;
    Ok(())
}

// =============================================================================
// RedbStore
// =============================================================================

/// Credential store persisted in a single redb file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(DEVICES)?;
            let _ = write_txn.open_table(DEVICES_BY_REFRESH_TOKEN)?;
            let _ = write_txn.open_table(FOLDERS)?;
            let _ = write_txn.open_table(CIPHERS)?;
            let _ = write_txn.open_table(ATTACHMENTS)?;
            let _ = write_txn.open_table(ATTACHMENT_DATA)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn get<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        get_json(&table, id)
    }

    fn scan<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        keep: impl FnMut(&T) -> bool,
    ) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        scan_json(&table, keep)
    }

    /// Insert a row that has no secondary index.
    fn insert_plain<T: Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        kind: &str,
        id: &str,
        record: &T,
    ) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table)?;
            if table.get(id)?.is_some() {
                return Err(StorageError::AlreadyExists(format!("{kind} {id}")));
            }
            put_json(&mut table, id, record)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite a row that has no secondary index.
    fn update_plain<T: Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        kind: &str,
        id: &str,
        record: &T,
    ) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table)?;
            if table.get(id)?.is_none() {
                return Err(StorageError::NotFound(format!("{kind} {id}")));
            }
            put_json(&mut table, id, record)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl CredentialStore for RedbStore {
    // ========== Users ==========

    fn list_users(&self) -> StorageResult<Vec<StoredUser>> {
        self.scan(USERS, |_| true)
    }

    fn get_user(&self, user_id: &str) -> StorageResult<Option<StoredUser>> {
        self.get(USERS, user_id)
    }

    fn find_user_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USERS_BY_EMAIL)?;
        let user_id = match index.get(email)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };
        let users = read_txn.open_table(USERS)?;
        get_json(&users, &user_id)
    }

    fn insert_user(&self, user: &StoredUser) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut index = write_txn.open_table(USERS_BY_EMAIL)?;
            if users.get(user.id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
            }
            if index.get(user.email.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "User with email {}",
                    user.email
                )));
            }
            put_json(&mut users, &user.id, user)?;
            index.insert(user.email.as_str(), user.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn update_user(&self, user: &StoredUser) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut index = write_txn.open_table(USERS_BY_EMAIL)?;
            let existing: StoredUser = get_json(&users, &user.id)?
                .ok_or_else(|| StorageError::NotFound(format!("User {}", user.id)))?;

            if existing.email != user.email {
                let taken = index
                    .get(user.email.as_str())?
                    .is_some_and(|owner| owner.value() != user.id);
                if taken {
                    return Err(StorageError::AlreadyExists(format!(
                        "User with email {}",
                        user.email
                    )));
                }
                index.remove(existing.email.as_str())?;
                index.insert(user.email.as_str(), user.id.as_str())?;
            }
            put_json(&mut users, &user.id, user)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Devices ==========

    fn list_devices(&self) -> StorageResult<Vec<StoredDevice>> {
        self.scan(DEVICES, |_| true)
    }

    fn get_device(&self, device_id: &str) -> StorageResult<Option<StoredDevice>> {
        self.get(DEVICES, device_id)
    }

    fn find_device_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<StoredDevice>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(DEVICES_BY_REFRESH_TOKEN)?;
        let device_id = match index.get(refresh_token)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };
        let devices = read_txn.open_table(DEVICES)?;
        get_json(&devices, &device_id)
    }

    fn list_devices_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredDevice>> {
        self.scan(DEVICES, |d: &StoredDevice| d.user_id == user_id)
    }

    fn insert_device(&self, device: &StoredDevice) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut devices = write_txn.open_table(DEVICES)?;
            let mut index = write_txn.open_table(DEVICES_BY_REFRESH_TOKEN)?;
            if devices.get(device.id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Device {}", device.id)));
            }
            if index.get(device.refresh_token.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(
                    "Device with this refresh token".to_string(),
                ));
            }
            put_json(&mut devices, &device.id, device)?;
            index.insert(device.refresh_token.as_str(), device.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn update_device(&self, device: &StoredDevice) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut devices = write_txn.open_table(DEVICES)?;
            let mut index = write_txn.open_table(DEVICES_BY_REFRESH_TOKEN)?;
            let existing: StoredDevice = get_json(&devices, &device.id)?
                .ok_or_else(|| StorageError::NotFound(format!("Device {}", device.id)))?;

            if existing.refresh_token != device.refresh_token {
                index.remove(existing.refresh_token.as_str())?;
                index.insert(device.refresh_token.as_str(), device.id.as_str())?;
            }
            put_json(&mut devices, &device.id, device)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Folders ==========

    fn list_folders(&self) -> StorageResult<Vec<StoredFolder>> {
        self.scan(FOLDERS, |_| true)
    }

    fn get_folder(&self, folder_id: &str) -> StorageResult<Option<StoredFolder>> {
        self.get(FOLDERS, folder_id)
    }

    fn list_folders_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredFolder>> {
        self.scan(FOLDERS, |f: &StoredFolder| f.user_id == user_id)
    }

    fn insert_folder(&self, folder: &StoredFolder) -> StorageResult<()> {
        self.insert_plain(FOLDERS, "Folder", &folder.id, folder)
    }

    fn update_folder(&self, folder: &StoredFolder) -> StorageResult<()> {
        self.update_plain(FOLDERS, "Folder", &folder.id, folder)
    }

    fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut folders = write_txn.open_table(FOLDERS)?;
            if folders.get(folder_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Folder {folder_id}")));
            }

            // Re-home the items first
            let mut ciphers = write_txn.open_table(CIPHERS)?;
            let referencing = scan_json(&ciphers, |c: &StoredCipher| {
                c.folder_id.as_deref() == Some(folder_id)
            })?;
            for mut cipher in referencing {
                cipher.folder_id = None;
                put_json(&mut ciphers, &cipher.id, &cipher)?;
            }

            folders.remove(folder_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Ciphers ==========

    fn list_ciphers(&self) -> StorageResult<Vec<StoredCipher>> {
        self.scan(CIPHERS, |_| true)
    }

    fn get_cipher(&self, cipher_id: &str) -> StorageResult<Option<StoredCipher>> {
        self.get(CIPHERS, cipher_id)
    }

    fn list_ciphers_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredCipher>> {
        self.scan(CIPHERS, |c: &StoredCipher| c.user_id == user_id)
    }

    fn list_ciphers_by_folder(&self, folder_id: &str) -> StorageResult<Vec<StoredCipher>> {
        self.scan(CIPHERS, |c: &StoredCipher| {
            c.folder_id.as_deref() == Some(folder_id)
        })
    }

    fn insert_cipher(&self, cipher: &StoredCipher) -> StorageResult<()> {
        self.insert_plain(CIPHERS, "Cipher", &cipher.id, cipher)
    }

    fn update_cipher(&self, cipher: &StoredCipher) -> StorageResult<()> {
        self.update_plain(CIPHERS, "Cipher", &cipher.id, cipher)
    }

    fn delete_cipher(&self, cipher_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut ciphers = write_txn.open_table(CIPHERS)?;
            if ciphers.get(cipher_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Cipher {cipher_id}")));
            }

            // Attachments go first
            let mut attachments = write_txn.open_table(ATTACHMENTS)?;
            let mut data = write_txn.open_table(ATTACHMENT_DATA)?;
            let owned = scan_json(&attachments, |a: &StoredAttachment| {
                a.cipher_id == cipher_id
            })?;
            for attachment in owned {
                data.remove(attachment.id.as_str())?;
                attachments.remove(attachment.id.as_str())?;
            }

            ciphers.remove(cipher_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Attachments ==========

    fn get_attachment(&self, attachment_id: &str) -> StorageResult<Option<StoredAttachment>> {
        self.get(ATTACHMENTS, attachment_id)
    }

    fn read_attachment_data(&self, attachment_id: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ATTACHMENT_DATA)?;
        Ok(table.get(attachment_id)?.map(|value| value.value().to_vec()))
    }

    fn list_attachments_by_cipher(
        &self,
        cipher_id: &str,
    ) -> StorageResult<Vec<StoredAttachment>> {
        self.scan(ATTACHMENTS, |a: &StoredAttachment| a.cipher_id == cipher_id)
    }

    fn insert_attachment(&self, attachment: &StoredAttachment, data: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut attachments = write_txn.open_table(ATTACHMENTS)?;
            if attachments.get(attachment.id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Attachment {}",
                    attachment.id
                )));
            }
            let mut table = write_txn.open_table(ATTACHMENT_DATA)?;
            table.insert(attachment.id.as_str(), data)?;
            put_json(&mut attachments, &attachment.id, attachment)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_attachment(&self, attachment_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut attachments = write_txn.open_table(ATTACHMENTS)?;
            if attachments.remove(attachment_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Attachment {attachment_id}")));
            }
            let mut data = write_txn.open_table(ATTACHMENT_DATA)?;
            data.remove(attachment_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Maintenance ==========

    fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance;

    fn temp_store() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join(DATABASE_FILE)).unwrap();
        (store, dir)
    }

    #[test]
    fn user_crud_and_email_index() {
        let (store, _dir) = temp_store();
        conformance::user_crud_and_email_index(&store);
    }

    #[test]
    fn device_crud_and_refresh_index() {
        let (store, _dir) = temp_store();
        conformance::device_crud_and_refresh_index(&store);
    }

    #[test]
    fn missing_rows_are_none_not_errors() {
        let (store, _dir) = temp_store();
        conformance::missing_rows_are_none_not_errors(&store);
    }

    #[test]
    fn folder_delete_rehomes_items() {
        let (store, _dir) = temp_store();
        conformance::folder_delete_rehomes_items(&store);
    }

    #[test]
    fn cipher_delete_cascades_attachments() {
        let (store, _dir) = temp_store();
        conformance::cipher_delete_cascades_attachments(&store);
    }

    #[test]
    fn update_and_delete_of_missing_rows_fail() {
        let (store, _dir) = temp_store();
        conformance::update_and_delete_of_missing_rows_fail(&store);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATABASE_FILE);
        let user = conformance::sample_user("persist@example.com");
        {
            let store = RedbStore::open(&path).unwrap();
            store.insert_user(&user).unwrap();
        }

        let reopened = RedbStore::open(&path).unwrap();
        let loaded = reopened
            .find_user_by_email("persist@example.com")
            .unwrap()
            .expect("user persisted");
        assert_eq!(loaded, user);
        reopened.health_check().unwrap();
    }
}
