// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item (cipher) create, update, delete and rendering.
//!
//! Nested item data (login, card, identity, fields, notes, secure note,
//! password history) is never interpreted: it is encoded into opaque blobs
//! on the way in and decoded back on render.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{attachments, folders::owned_folder, non_empty, revision_date, VaultError};
use crate::codec::{decode_list, decode_value, encode_list, encode_value};
use crate::models::{CipherObject, CipherRequest};
use crate::storage::{CredentialStore, OwnedResource, StoredAttachment, StoredCipher};

/// Load an item the caller owns.
pub(crate) fn owned_cipher(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: &str,
) -> Result<StoredCipher, VaultError> {
    let cipher = store
        .get_cipher(cipher_id)?
        .ok_or_else(|| VaultError::CipherNotFound(cipher_id.to_string()))?;
    if !cipher.is_owned_by(user_id) {
        return Err(VaultError::CipherOwnedByOther(cipher_id.to_string()));
    }
    Ok(cipher)
}

/// Validate the request's folder and build the row to persist.
fn to_stored(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: String,
    request: &CipherRequest,
    now: DateTime<Utc>,
) -> Result<StoredCipher, VaultError> {
    let cipher_type = request.cipher_type.ok_or(VaultError::MissingField("type"))?;
    let name = non_empty(request.name.as_deref()).ok_or(VaultError::MissingField("name"))?;

    let folder_id = non_empty(request.folder_id.as_deref());
    if let Some(folder_id) = &folder_id {
        owned_folder(store, user_id, folder_id)?;
    }

    Ok(StoredCipher {
        id: cipher_id,
        user_id: user_id.to_string(),
        folder_id,
        organization_id: non_empty(request.organization_id.as_deref()),
        cipher_type,
        name,
        notes: encode_value(request.notes.as_ref()),
        fields: encode_list(request.fields.as_deref()),
        login: encode_value(request.login.as_ref()),
        card: encode_value(request.card.as_ref()),
        identity: encode_value(request.identity.as_ref()),
        secure_note: encode_value(request.secure_note.as_ref()),
        password_history: encode_list(request.password_history.as_deref()),
        favorite: request.favorite.unwrap_or(false),
        updated_at: now,
    })
}

/// Create an item under a fresh id. Any id in the body is ignored.
pub fn create(
    store: &dyn CredentialStore,
    user_id: &str,
    request: &CipherRequest,
    now: DateTime<Utc>,
) -> Result<StoredCipher, VaultError> {
    let cipher = to_stored(store, user_id, Uuid::new_v4().to_string(), request, now)?;
    store.insert_cipher(&cipher)?;
    tracing::debug!(cipher_id = %cipher.id, user_id = %user_id, "Cipher created");
    Ok(cipher)
}

/// Replace an item the caller owns.
pub fn update(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: &str,
    request: &CipherRequest,
    now: DateTime<Utc>,
) -> Result<StoredCipher, VaultError> {
    owned_cipher(store, user_id, cipher_id)?;
    let cipher = to_stored(store, user_id, cipher_id.to_string(), request, now)?;
    store.update_cipher(&cipher)?;
    Ok(cipher)
}

/// Delete an item the caller owns, with all its attachments.
pub fn delete(
    store: &dyn CredentialStore,
    user_id: &str,
    cipher_id: &str,
) -> Result<(), VaultError> {
    owned_cipher(store, user_id, cipher_id)?;
    store.delete_cipher(cipher_id)?;
    tracing::debug!(cipher_id = %cipher_id, user_id = %user_id, "Cipher deleted");
    Ok(())
}

pub fn render(
    cipher: &StoredCipher,
    cipher_attachments: &[StoredAttachment],
    attachment_base: &str,
) -> CipherObject {
    let rendered_attachments = if cipher_attachments.is_empty() {
        None
    } else {
        Some(
            cipher_attachments
                .iter()
                .map(|a| attachments::render(a, attachment_base))
                .collect(),
        )
    };

    CipherObject {
        id: cipher.id.clone(),
        folder_id: cipher.folder_id.clone(),
        organization_id: cipher.organization_id.clone(),
        organization_use_totp: false,
        cipher_type: cipher.cipher_type,
        favorite: cipher.favorite,
        attachments: rendered_attachments,
        name: cipher.name.clone(),
        totp: None,
        notes: decode_value(cipher.notes.as_ref()),
        fields: decode_list(cipher.fields.as_ref()),
        login: decode_value(cipher.login.as_ref()),
        card: decode_value(cipher.card.as_ref()),
        identity: decode_value(cipher.identity.as_ref()),
        secure_note: decode_value(cipher.secure_note.as_ref()),
        password_history: decode_list(cipher.password_history.as_ref()),
        revision_date: revision_date(cipher.updated_at),
        edit: true,
        object: "cipher".to_string(),
    }
}

/// Render an item with its attachments looked up from the store.
pub fn render_stored(
    store: &dyn CredentialStore,
    cipher: &StoredCipher,
    attachment_base: &str,
) -> Result<CipherObject, VaultError> {
    let cipher_attachments = store.list_attachments_by_cipher(&cipher.id)?;
    Ok(render(cipher, &cipher_attachments, attachment_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance::{sample_attachment, sample_folder};
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn login_item(folder_id: Option<&str>) -> CipherRequest {
        serde_json::from_value(json!({
            "type": 1,
            "folderId": folder_id,
            "name": "2.name",
            "notes": null,
            "fields": [],
            "login": {"Username": "2.user", "Password": "2.pass", "Uris": null},
            "favorite": true,
        }))
        .unwrap()
    }

    #[test]
    fn create_encodes_and_render_decodes() {
        let store = InMemoryStore::new();
        let cipher = create(&store, "user-1", &login_item(None), Utc::now()).unwrap();

        assert!(cipher.notes.is_none());
        assert!(cipher.fields.is_none());
        assert!(cipher.login.is_some());

        let rendered = render_stored(&store, &cipher, "/attachments").unwrap();
        assert_eq!(rendered.cipher_type, 1);
        assert!(rendered.favorite);
        assert_eq!(rendered.folder_id, None);
        assert_eq!(rendered.fields, None);
        assert_eq!(rendered.notes, None);
        assert_eq!(rendered.attachments, None);
        assert_eq!(
            rendered.login,
            Some(json!({"Username": "2.user", "Password": "2.pass", "Uris": null}))
        );
        assert!(rendered.edit);
        assert_eq!(rendered.object, "cipher");
    }

    #[test]
    fn create_generates_fresh_ids() {
        let store = InMemoryStore::new();
        let a = create(&store, "user-1", &login_item(None), Utc::now()).unwrap();
        let b = create(&store, "user-1", &login_item(None), Utc::now()).unwrap();
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn empty_folder_id_means_no_folder() {
        let store = InMemoryStore::new();
        let cipher = create(&store, "user-1", &login_item(Some("")), Utc::now()).unwrap();
        assert_eq!(cipher.folder_id, None);
    }

    #[test]
    fn folder_must_exist_and_be_owned() {
        let store = InMemoryStore::new();
        let foreign = sample_folder("user-2");
        store.insert_folder(&foreign).unwrap();

        assert!(matches!(
            create(&store, "user-1", &login_item(Some("ghost")), Utc::now()),
            Err(VaultError::FolderNotFound(_))
        ));
        assert!(matches!(
            create(&store, "user-1", &login_item(Some(&foreign.id)), Utc::now()),
            Err(VaultError::FolderOwnedByOther(_))
        ));
        assert!(store.list_ciphers().unwrap().is_empty());
    }

    #[test]
    fn update_requires_existing_owned_item() {
        let store = InMemoryStore::new();
        let folder = sample_folder("user-1");
        store.insert_folder(&folder).unwrap();
        let cipher = create(&store, "user-1", &login_item(None), Utc::now()).unwrap();

        assert!(matches!(
            update(&store, "user-1", "ghost", &login_item(None), Utc::now()),
            Err(VaultError::CipherNotFound(_))
        ));
        assert!(matches!(
            update(&store, "user-2", &cipher.id, &login_item(None), Utc::now()),
            Err(VaultError::CipherOwnedByOther(_))
        ));

        let moved = update(
            &store,
            "user-1",
            &cipher.id,
            &login_item(Some(&folder.id)),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(moved.id, cipher.id);
        assert_eq!(
            store.get_cipher(&cipher.id).unwrap().unwrap().folder_id,
            Some(folder.id.clone())
        );
    }

    #[test]
    fn delete_cascades_attachments() {
        let store = InMemoryStore::new();
        let cipher = create(&store, "user-1", &login_item(None), Utc::now()).unwrap();
        let attachment = sample_attachment(&cipher.id);
        store.insert_attachment(&attachment, b"bytes").unwrap();

        let rendered = render_stored(&store, &cipher, "/attachments").unwrap();
        assert_eq!(rendered.attachments.map(|a| a.len()), Some(1));

        assert!(matches!(
            delete(&store, "user-2", &cipher.id),
            Err(VaultError::CipherOwnedByOther(_))
        ));
        delete(&store, "user-1", &cipher.id).unwrap();
        assert!(store.get_cipher(&cipher.id).unwrap().is_none());
        assert!(store.get_attachment(&attachment.id).unwrap().is_none());

        assert!(matches!(
            delete(&store, "user-1", &cipher.id),
            Err(VaultError::CipherNotFound(_))
        ));
    }

    #[test]
    fn missing_type_or_name_is_rejected() {
        let store = InMemoryStore::new();
        let no_type: CipherRequest = serde_json::from_value(json!({"name": "2.n"})).unwrap();
        assert!(matches!(
            create(&store, "user-1", &no_type, Utc::now()),
            Err(VaultError::MissingField("type"))
        ));
        let no_name: CipherRequest = serde_json::from_value(json!({"type": 2})).unwrap();
        assert!(matches!(
            create(&store, "user-1", &no_name, Utc::now()),
            Err(VaultError::MissingField("name"))
        ));
    }
}
