// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attachments: opaque files bound to an item.
//!
//! Bytes are stored as sent (already encrypted client side) and keyed by
//! attachment id. Deleting the item deletes its attachments; deleting one
//! attachment leaves the item alone.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ciphers::owned_cipher, revision_date, VaultError};
use crate::models::AttachmentObject;
use crate::storage::{CredentialStore, StoredAttachment, StoredCipher};

const SIZE_UNITS: [&str; 5] = ["bytes", "KiB", "MiB", "GiB", "TiB"];

/// Human-readable size with binary scaling: `512 bytes`, `1.2 MiB`.
pub fn display_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{size:.1}");
    let rounded = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/// Download URL of an attachment under `base`.
pub fn url(base: &str, attachment: &StoredAttachment) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        attachment.cipher_id,
        attachment.id
    )
}

pub fn render(attachment: &StoredAttachment, base: &str) -> AttachmentObject {
    AttachmentObject {
        id: attachment.id.clone(),
        url: url(base, attachment),
        file_name: attachment.file_name.clone(),
        size: attachment.size.to_string(),
        size_name: display_size(attachment.size),
        revision_date: revision_date(attachment.updated_at),
        object: "attachment".to_string(),
    }
}

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Encrypted file name
    pub file_name: String,
    /// Declared size; the byte count is used when absent
    pub size: Option<u64>,
    pub data: Vec<u8>,
}

/// Bind an uploaded file to an existing item. Returns the item.
pub fn add(
    store: &dyn CredentialStore,
    cipher_id: &str,
    upload: Upload,
    now: DateTime<Utc>,
) -> Result<StoredCipher, VaultError> {
    let cipher = store
        .get_cipher(cipher_id)?
        .ok_or_else(|| VaultError::CipherNotFound(cipher_id.to_string()))?;

    let attachment = StoredAttachment {
        id: Uuid::new_v4().to_string(),
        cipher_id: cipher.id.clone(),
        file_name: upload.file_name,
        size: upload.size.unwrap_or(upload.data.len() as u64),
        updated_at: now,
    };
    store.insert_attachment(&attachment, &upload.data)?;
    tracing::debug!(
        attachment_id = %attachment.id,
        cipher_id = %cipher.id,
        size = attachment.size,
        "Attachment stored"
    );
    Ok(cipher)
}

/// Attachment of an item the caller owns.
fn owned_attachment(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: &str,
    attachment_id: &str,
) -> Result<StoredAttachment, VaultError> {
    owned_cipher(store, user_id, cipher_id)?;
    let attachment = store
        .get_attachment(attachment_id)?
        .ok_or_else(|| VaultError::AttachmentNotFound(attachment_id.to_string()))?;
    if attachment.cipher_id != cipher_id {
        return Err(VaultError::AttachmentMismatch(attachment_id.to_string()));
    }
    Ok(attachment)
}

/// Metadata and bytes of an attachment.
pub fn fetch(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: &str,
    attachment_id: &str,
) -> Result<(StoredAttachment, Vec<u8>), VaultError> {
    let attachment = owned_attachment(store, user_id, cipher_id, attachment_id)?;
    let data = store
        .read_attachment_data(attachment_id)?
        .ok_or_else(|| VaultError::AttachmentNotFound(attachment_id.to_string()))?;
    Ok((attachment, data))
}

pub fn delete(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: &str,
    attachment_id: &str,
) -> Result<(), VaultError> {
    owned_attachment(store, user_id, cipher_id, attachment_id)?;
    store.delete_attachment(attachment_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance::sample_cipher;
    use crate::storage::InMemoryStore;

    fn upload(data: &[u8]) -> Upload {
        Upload {
            file_name: "2.file".to_string(),
            size: None,
            data: data.to_vec(),
        }
    }

    #[test]
    fn display_size_scales_by_1024() {
        assert_eq!(display_size(0), "0 bytes");
        assert_eq!(display_size(512), "512 bytes");
        assert_eq!(display_size(1023), "1023 bytes");
        assert_eq!(display_size(1024), "1 KiB");
        assert_eq!(display_size(1536), "1.5 KiB");
        assert_eq!(display_size(1_258_291), "1.2 MiB");
        assert_eq!(display_size(5 * 1024 * 1024 * 1024), "5 GiB");
    }

    #[test]
    fn render_builds_download_url() {
        let attachment = StoredAttachment {
            id: "a-1".to_string(),
            cipher_id: "c-1".to_string(),
            file_name: "2.file".to_string(),
            size: 2048,
            updated_at: Utc::now(),
        };
        let rendered = render(&attachment, "https://vault.example.com/attachments/");
        assert_eq!(rendered.url, "https://vault.example.com/attachments/c-1/a-1");
        assert_eq!(rendered.size, "2048");
        assert_eq!(rendered.size_name, "2 KiB");
        assert_eq!(rendered.object, "attachment");
    }

    #[test]
    fn add_requires_existing_item() {
        let store = InMemoryStore::new();
        assert!(matches!(
            add(&store, "ghost", upload(b"data"), Utc::now()),
            Err(VaultError::CipherNotFound(_))
        ));

        let cipher = sample_cipher("user-1", None);
        store.insert_cipher(&cipher).unwrap();
        add(&store, &cipher.id, upload(b"data"), Utc::now()).unwrap();

        let attachments = store.list_attachments_by_cipher(&cipher.id).unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].size, 4);
    }

    #[test]
    fn fetch_and_delete_check_ownership() {
        let store = InMemoryStore::new();
        let cipher = sample_cipher("user-1", None);
        let other = sample_cipher("user-1", None);
        store.insert_cipher(&cipher).unwrap();
        store.insert_cipher(&other).unwrap();
        add(&store, &cipher.id, upload(b"secret"), Utc::now()).unwrap();
        let attachment_id = store.list_attachments_by_cipher(&cipher.id).unwrap()[0]
            .id
            .clone();

        let (meta, data) = fetch(&store, "user-1", &cipher.id, &attachment_id).unwrap();
        assert_eq!(meta.id, attachment_id);
        assert_eq!(data, b"secret");

        assert!(matches!(
            fetch(&store, "user-2", &cipher.id, &attachment_id),
            Err(VaultError::CipherOwnedByOther(_))
        ));
        assert!(matches!(
            fetch(&store, "user-1", &other.id, &attachment_id),
            Err(VaultError::AttachmentMismatch(_))
        ));

        delete(&store, "user-1", &cipher.id, &attachment_id).unwrap();
        assert!(store.get_cipher(&cipher.id).unwrap().is_some());
        assert!(matches!(
            fetch(&store, "user-1", &cipher.id, &attachment_id),
            Err(VaultError::AttachmentNotFound(_))
        ));
    }
}
