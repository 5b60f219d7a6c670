// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory credential store.
//!
//! Volatile; everything is lost on restart. Used when `STORE_BACKEND=memory`
//! and by the handler tests. Rows keep insertion order so listings are stable.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    CredentialStore, StorageError, StorageResult, StoredAttachment, StoredCipher, StoredDevice,
    StoredFolder, StoredUser,
};

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    devices: Vec<StoredDevice>,
    folders: Vec<StoredFolder>,
    ciphers: Vec<StoredCipher>,
    attachments: Vec<StoredAttachment>,
    attachment_data: HashMap<String, Vec<u8>>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    fail_device_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    /// Make every device insert/update fail until switched off again.
    #[cfg(test)]
    pub fn fail_device_writes(&self, fail: bool) {
        self.fail_device_writes.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_device_writes(&self) -> StorageResult<()> {
        if self.fail_device_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "device writes disabled".to_string(),
            ));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_device_writes(&self) -> StorageResult<()> {
        Ok(())
    }
}

fn replace<T: Clone>(
    rows: &mut [T],
    kind: &str,
    id: &str,
    id_of: impl Fn(&T) -> &str,
    row: &T,
) -> StorageResult<()> {
    let slot = rows
        .iter_mut()
        .find(|existing| id_of(existing) == id)
        .ok_or_else(|| StorageError::NotFound(format!("{kind} {id}")))?;
    *slot = row.clone();
    Ok(())
}

impl CredentialStore for InMemoryStore {
    // ========== Users ==========

    fn list_users(&self) -> StorageResult<Vec<StoredUser>> {
        Ok(self.read()?.users.clone())
    }

    fn get_user(&self, user_id: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self.read()?.users.iter().find(|u| u.id == user_id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    fn insert_user(&self, user: &StoredUser) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    fn update_user(&self, user: &StoredUser) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }
        replace(&mut tables.users, "User", &user.id, |u| &u.id, user)
    }

    // ========== Devices ==========

    fn list_devices(&self) -> StorageResult<Vec<StoredDevice>> {
        Ok(self.read()?.devices.clone())
    }

    fn get_device(&self, device_id: &str) -> StorageResult<Option<StoredDevice>> {
        Ok(self.read()?.devices.iter().find(|d| d.id == device_id).cloned())
    }

    fn find_device_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<StoredDevice>> {
        Ok(self
            .read()?
            .devices
            .iter()
            .find(|d| d.refresh_token == refresh_token)
            .cloned())
    }

    fn list_devices_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredDevice>> {
        Ok(self
            .read()?
            .devices
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    fn insert_device(&self, device: &StoredDevice) -> StorageResult<()> {
        self.check_device_writes()?;
        let mut tables = self.write()?;
        if tables.devices.iter().any(|d| d.id == device.id) {
            return Err(StorageError::AlreadyExists(format!("Device {}", device.id)));
        }
        if tables
            .devices
            .iter()
            .any(|d| d.refresh_token == device.refresh_token)
        {
            return Err(StorageError::AlreadyExists(
                "Device with this refresh token".to_string(),
            ));
        }
        tables.devices.push(device.clone());
        Ok(())
    }

    fn update_device(&self, device: &StoredDevice) -> StorageResult<()> {
        self.check_device_writes()?;
        let mut tables = self.write()?;
        replace(&mut tables.devices, "Device", &device.id, |d| &d.id, device)
    }

    // ========== Folders ==========

    fn list_folders(&self) -> StorageResult<Vec<StoredFolder>> {
        Ok(self.read()?.folders.clone())
    }

    fn get_folder(&self, folder_id: &str) -> StorageResult<Option<StoredFolder>> {
        Ok(self.read()?.folders.iter().find(|f| f.id == folder_id).cloned())
    }

    fn list_folders_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredFolder>> {
        Ok(self
            .read()?
            .folders
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    fn insert_folder(&self, folder: &StoredFolder) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.folders.iter().any(|f| f.id == folder.id) {
            return Err(StorageError::AlreadyExists(format!("Folder {}", folder.id)));
        }
        tables.folders.push(folder.clone());
        Ok(())
    }

    fn update_folder(&self, folder: &StoredFolder) -> StorageResult<()> {
        let mut tables = self.write()?;
        replace(&mut tables.folders, "Folder", &folder.id, |f| &f.id, folder)
    }

    fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        let mut tables = self.write()?;
        let position = tables
            .folders
            .iter()
            .position(|f| f.id == folder_id)
            .ok_or_else(|| StorageError::NotFound(format!("Folder {folder_id}")))?;

        for cipher in tables
            .ciphers
            .iter_mut()
            .filter(|c| c.folder_id.as_deref() == Some(folder_id))
        {
            cipher.folder_id = None;
        }
        tables.folders.remove(position);
        Ok(())
    }

    // ========== Ciphers ==========

    fn list_ciphers(&self) -> StorageResult<Vec<StoredCipher>> {
        Ok(self.read()?.ciphers.clone())
    }

    fn get_cipher(&self, cipher_id: &str) -> StorageResult<Option<StoredCipher>> {
        Ok(self.read()?.ciphers.iter().find(|c| c.id == cipher_id).cloned())
    }

    fn list_ciphers_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredCipher>> {
        Ok(self
            .read()?
            .ciphers
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_ciphers_by_folder(&self, folder_id: &str) -> StorageResult<Vec<StoredCipher>> {
        Ok(self
            .read()?
            .ciphers
            .iter()
            .filter(|c| c.folder_id.as_deref() == Some(folder_id))
            .cloned()
            .collect())
    }

    fn insert_cipher(&self, cipher: &StoredCipher) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.ciphers.iter().any(|c| c.id == cipher.id) {
            return Err(StorageError::AlreadyExists(format!("Cipher {}", cipher.id)));
        }
        tables.ciphers.push(cipher.clone());
        Ok(())
    }

    fn update_cipher(&self, cipher: &StoredCipher) -> StorageResult<()> {
        let mut tables = self.write()?;
        replace(&mut tables.ciphers, "Cipher", &cipher.id, |c| &c.id, cipher)
    }

    fn delete_cipher(&self, cipher_id: &str) -> StorageResult<()> {
        let mut tables = self.write()?;
        let position = tables
            .ciphers
            .iter()
            .position(|c| c.id == cipher_id)
            .ok_or_else(|| StorageError::NotFound(format!("Cipher {cipher_id}")))?;

        let Tables {
            attachments,
            attachment_data,
            ..
        } = &mut *tables;
        attachments.retain(|a| {
            if a.cipher_id == cipher_id {
                attachment_data.remove(&a.id);
                false
            } else {
                true
            }
        });
        tables.ciphers.remove(position);
        Ok(())
    }

    // ========== Attachments ==========

    fn get_attachment(&self, attachment_id: &str) -> StorageResult<Option<StoredAttachment>> {
        Ok(self
            .read()?
            .attachments
            .iter()
            .find(|a| a.id == attachment_id)
            .cloned())
    }

    fn read_attachment_data(&self, attachment_id: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.read()?.attachment_data.get(attachment_id).cloned())
    }

    fn list_attachments_by_cipher(
        &self,
        cipher_id: &str,
    ) -> StorageResult<Vec<StoredAttachment>> {
        Ok(self
            .read()?
            .attachments
            .iter()
            .filter(|a| a.cipher_id == cipher_id)
            .cloned()
            .collect())
    }

    fn insert_attachment(&self, attachment: &StoredAttachment, data: &[u8]) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.attachments.iter().any(|a| a.id == attachment.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Attachment {}",
                attachment.id
            )));
        }
        tables
            .attachment_data
            .insert(attachment.id.clone(), data.to_vec());
        tables.attachments.push(attachment.clone());
        Ok(())
    }

    fn delete_attachment(&self, attachment_id: &str) -> StorageResult<()> {
        let mut tables = self.write()?;
        let position = tables
            .attachments
            .iter()
            .position(|a| a.id == attachment_id)
            .ok_or_else(|| StorageError::NotFound(format!("Attachment {attachment_id}")))?;
        tables.attachments.remove(position);
        tables.attachment_data.remove(attachment_id);
        Ok(())
    }

    // ========== Maintenance ==========

    fn health_check(&self) -> StorageResult<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance;

    #[test]
    fn user_crud_and_email_index() {
        conformance::user_crud_and_email_index(&InMemoryStore::new());
    }

    #[test]
    fn device_crud_and_refresh_index() {
        conformance::device_crud_and_refresh_index(&InMemoryStore::new());
    }

    #[test]
    fn missing_rows_are_none_not_errors() {
        conformance::missing_rows_are_none_not_errors(&InMemoryStore::new());
    }

    #[test]
    fn folder_delete_rehomes_items() {
        conformance::folder_delete_rehomes_items(&InMemoryStore::new());
    }

    #[test]
    fn cipher_delete_cascades_attachments() {
        conformance::cipher_delete_cascades_attachments(&InMemoryStore::new());
    }

    #[test]
    fn update_and_delete_of_missing_rows_fail() {
        conformance::update_and_delete_of_missing_rows_fail(&InMemoryStore::new());
    }

    #[test]
    fn device_write_failure_switch() {
        let store = InMemoryStore::new();
        let device = StoredDevice::new("dev-1", "cli", "8", "user-1", "refresh-1");
        store.fail_device_writes(true);
        assert!(matches!(
            store.insert_device(&device),
            Err(StorageError::Unavailable(_))
        ));
        store.fail_device_writes(false);
        store.insert_device(&device).unwrap();
    }
}
