// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Behaviour every credential store adapter must share. Each adapter's test
//! module runs these against its own instance.

use chrono::Utc;
use uuid::Uuid;

use super::{
    CredentialStore, StorageError, StoredAttachment, StoredCipher, StoredDevice, StoredFolder,
    StoredUser,
};
use crate::codec::Blob;

pub fn sample_user(email: &str) -> StoredUser {
    StoredUser::new(email, "Sample", "hash", None, "2.key", 0, 100_000)
}

pub fn sample_folder(user_id: &str) -> StoredFolder {
    StoredFolder {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: Blob::from("2.folder"),
        updated_at: Utc::now(),
    }
}

pub fn sample_cipher(user_id: &str, folder_id: Option<&str>) -> StoredCipher {
    StoredCipher {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        folder_id: folder_id.map(str::to_string),
        organization_id: None,
        cipher_type: 1,
        name: "2.item".to_string(),
        notes: None,
        fields: None,
        login: Some(Blob::from(r#"{"Username":"2.u"}"#)),
        card: None,
        identity: None,
        secure_note: None,
        password_history: None,
        favorite: false,
        updated_at: Utc::now(),
    }
}

pub fn sample_attachment(cipher_id: &str) -> StoredAttachment {
    StoredAttachment {
        id: Uuid::new_v4().to_string(),
        cipher_id: cipher_id.to_string(),
        file_name: "2.file".to_string(),
        size: 4,
        updated_at: Utc::now(),
    }
}

pub fn user_crud_and_email_index(store: &dyn CredentialStore) {
    let mut user = sample_user("alice@example.com");
    store.insert_user(&user).unwrap();

    let found = store.find_user_by_email("alice@example.com").unwrap();
    assert_eq!(found.as_ref(), Some(&user));
    assert!(store.find_user_by_email("Alice@example.com").unwrap().is_none());

    let duplicate = sample_user("alice@example.com");
    assert!(matches!(
        store.insert_user(&duplicate),
        Err(StorageError::AlreadyExists(_))
    ));

    user.email = "alice@new.example.com".to_string();
    user.name = "Alice".to_string();
    store.update_user(&user).unwrap();
    assert!(store.find_user_by_email("alice@example.com").unwrap().is_none());
    assert_eq!(
        store
            .find_user_by_email("alice@new.example.com")
            .unwrap()
            .map(|u| u.name),
        Some("Alice".to_string())
    );
    assert_eq!(store.list_users().unwrap().len(), 1);
}

pub fn device_crud_and_refresh_index(store: &dyn CredentialStore) {
    let mut device = StoredDevice::new("dev-1", "Firefox", "3", "user-1", "refresh-1");
    store.insert_device(&device).unwrap();
    store
        .insert_device(&StoredDevice::new("dev-2", "cli", "8", "user-2", "refresh-2"))
        .unwrap();

    let by_token = store.find_device_by_refresh_token("refresh-1").unwrap();
    assert_eq!(by_token.map(|d| d.id), Some("dev-1".to_string()));

    device.push_token = Some("push".to_string());
    device.access_token = Some("jwt".to_string());
    store.update_device(&device).unwrap();
    assert_eq!(
        store.get_device("dev-1").unwrap().and_then(|d| d.push_token),
        Some("push".to_string())
    );

    let mine = store.list_devices_by_user("user-1").unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(store.list_devices().unwrap().len(), 2);
}

pub fn missing_rows_are_none_not_errors(store: &dyn CredentialStore) {
    assert!(store.get_user("nope").unwrap().is_none());
    assert!(store.find_user_by_email("nope@example.com").unwrap().is_none());
    assert!(store.get_device("nope").unwrap().is_none());
    assert!(store.find_device_by_refresh_token("nope").unwrap().is_none());
    assert!(store.get_folder("nope").unwrap().is_none());
    assert!(store.get_cipher("nope").unwrap().is_none());
    assert!(store.get_attachment("nope").unwrap().is_none());
    assert!(store.read_attachment_data("nope").unwrap().is_none());
    assert!(store.list_ciphers_by_user("nope").unwrap().is_empty());
}

pub fn folder_delete_rehomes_items(store: &dyn CredentialStore) {
    let folder = sample_folder("user-1");
    let other_folder = sample_folder("user-1");
    store.insert_folder(&folder).unwrap();
    store.insert_folder(&other_folder).unwrap();

    let inside = sample_cipher("user-1", Some(&folder.id));
    let elsewhere = sample_cipher("user-1", Some(&other_folder.id));
    store.insert_cipher(&inside).unwrap();
    store.insert_cipher(&elsewhere).unwrap();
    assert_eq!(store.list_ciphers_by_folder(&folder.id).unwrap().len(), 1);

    store.delete_folder(&folder.id).unwrap();

    assert!(store.get_folder(&folder.id).unwrap().is_none());
    let rehomed = store.get_cipher(&inside.id).unwrap().expect("item kept");
    assert_eq!(rehomed.folder_id, None);
    let untouched = store.get_cipher(&elsewhere.id).unwrap().expect("item kept");
    assert_eq!(untouched.folder_id, Some(other_folder.id.clone()));
    assert_eq!(store.list_folders_by_user("user-1").unwrap().len(), 1);
}

pub fn cipher_delete_cascades_attachments(store: &dyn CredentialStore) {
    let cipher = sample_cipher("user-1", None);
    let sibling = sample_cipher("user-1", None);
    store.insert_cipher(&cipher).unwrap();
    store.insert_cipher(&sibling).unwrap();

    let first = sample_attachment(&cipher.id);
    let second = sample_attachment(&cipher.id);
    let kept = sample_attachment(&sibling.id);
    store.insert_attachment(&first, b"one!").unwrap();
    store.insert_attachment(&second, b"two!").unwrap();
    store.insert_attachment(&kept, b"keep").unwrap();
    assert_eq!(
        store.read_attachment_data(&first.id).unwrap(),
        Some(b"one!".to_vec())
    );

    store.delete_cipher(&cipher.id).unwrap();

    assert!(store.get_cipher(&cipher.id).unwrap().is_none());
    assert!(store.list_attachments_by_cipher(&cipher.id).unwrap().is_empty());
    assert!(store.get_attachment(&first.id).unwrap().is_none());
    assert!(store.read_attachment_data(&second.id).unwrap().is_none());
    assert_eq!(store.list_attachments_by_cipher(&sibling.id).unwrap(), vec![kept.clone()]);
    assert_eq!(
        store.read_attachment_data(&kept.id).unwrap(),
        Some(b"keep".to_vec())
    );

    store.delete_attachment(&kept.id).unwrap();
    assert!(store.read_attachment_data(&kept.id).unwrap().is_none());
}

pub fn update_and_delete_of_missing_rows_fail(store: &dyn CredentialStore) {
    assert!(store
        .update_user(&sample_user("ghost@example.com"))
        .unwrap_err()
        .is_not_found());
    assert!(store
        .update_device(&StoredDevice::new("ghost", "x", "0", "u", "r"))
        .unwrap_err()
        .is_not_found());
    assert!(store
        .update_folder(&sample_folder("u"))
        .unwrap_err()
        .is_not_found());
    assert!(store
        .update_cipher(&sample_cipher("u", None))
        .unwrap_err()
        .is_not_found());
    assert!(store.delete_folder("ghost").unwrap_err().is_not_found());
    assert!(store.delete_cipher("ghost").unwrap_err().is_not_found());
    assert!(store.delete_attachment("ghost").unwrap_err().is_not_found());
}
