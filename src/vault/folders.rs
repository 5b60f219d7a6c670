// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Folder create, update and delete.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{non_empty, revision_date, VaultError};
use crate::codec::Blob;
use crate::models::{FolderObject, FolderRequest};
use crate::storage::{CredentialStore, OwnedResource, StoredFolder};

pub fn render(folder: &StoredFolder) -> FolderObject {
    FolderObject {
        id: folder.id.clone(),
        name: folder.name.to_string_lossy(),
        revision_date: revision_date(folder.updated_at),
        object: "folder".to_string(),
    }
}

/// Load a folder the caller owns.
pub(crate) fn owned_folder(
    store: &dyn CredentialStore,
    user_id: &str,
    folder_id: &str,
) -> Result<StoredFolder, VaultError> {
    let folder = store
        .get_folder(folder_id)?
        .ok_or_else(|| VaultError::FolderNotFound(folder_id.to_string()))?;
    if !folder.is_owned_by(user_id) {
        return Err(VaultError::FolderOwnedByOther(folder_id.to_string()));
    }
    Ok(folder)
}

fn folder_name(request: &FolderRequest) -> Result<Blob, VaultError> {
    non_empty(request.name.as_deref())
        .map(Blob::from)
        .ok_or(VaultError::MissingField("name"))
}

/// Create a folder under a fresh id.
pub fn create(
    store: &dyn CredentialStore,
    user_id: &str,
    request: &FolderRequest,
    now: DateTime<Utc>,
) -> Result<StoredFolder, VaultError> {
    let folder = StoredFolder {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: folder_name(request)?,
        updated_at: now,
    };
    store.insert_folder(&folder)?;
    tracing::debug!(folder_id = %folder.id, user_id = %user_id, "Folder created");
    Ok(folder)
}

/// Rename a folder the caller owns.
pub fn update(
    store: &dyn CredentialStore,
    user_id: &str,
    folder_id: &str,
    request: &FolderRequest,
    now: DateTime<Utc>,
) -> Result<StoredFolder, VaultError> {
    let mut folder = owned_folder(store, user_id, folder_id)?;
    folder.name = folder_name(request)?;
    folder.updated_at = now;
    store.update_folder(&folder)?;
    Ok(folder)
}

/// Delete a folder the caller owns. Its items stay, with no folder.
pub fn delete(
    store: &dyn CredentialStore,
    user_id: &str,
    folder_id: &str,
) -> Result<(), VaultError> {
    owned_folder(store, user_id, folder_id)?;
    store.delete_folder(folder_id)?;
    tracing::debug!(folder_id = %folder_id, user_id = %user_id, "Folder deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance::sample_cipher;
    use crate::storage::InMemoryStore;

    fn named(name: &str) -> FolderRequest {
        FolderRequest {
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn create_requires_a_name() {
        let store = InMemoryStore::new();
        let folder = create(&store, "user-1", &named("2.Work"), Utc::now()).unwrap();
        assert_eq!(render(&folder).name, "2.Work");
        assert_eq!(render(&folder).object, "folder");
        assert_eq!(store.list_folders_by_user("user-1").unwrap(), vec![folder]);

        assert!(matches!(
            create(&store, "user-1", &FolderRequest { name: None }, Utc::now()),
            Err(VaultError::MissingField("name"))
        ));
    }

    #[test]
    fn update_requires_ownership() {
        let store = InMemoryStore::new();
        let folder = create(&store, "user-1", &named("2.Work"), Utc::now()).unwrap();

        assert!(matches!(
            update(&store, "user-2", &folder.id, &named("2.Mine"), Utc::now()),
            Err(VaultError::FolderOwnedByOther(_))
        ));
        assert!(matches!(
            update(&store, "user-1", "ghost", &named("2.Mine"), Utc::now()),
            Err(VaultError::FolderNotFound(_))
        ));

        let renamed = update(&store, "user-1", &folder.id, &named("2.Home"), Utc::now()).unwrap();
        assert_eq!(renamed.id, folder.id);
        assert_eq!(
            store.get_folder(&folder.id).unwrap().unwrap().name,
            Blob::from("2.Home")
        );
    }

    #[test]
    fn delete_rehomes_items() {
        let store = InMemoryStore::new();
        let folder = create(&store, "user-1", &named("2.Work"), Utc::now()).unwrap();
        let first = sample_cipher("user-1", Some(&folder.id));
        let second = sample_cipher("user-1", Some(&folder.id));
        store.insert_cipher(&first).unwrap();
        store.insert_cipher(&second).unwrap();

        assert!(matches!(
            delete(&store, "user-2", &folder.id),
            Err(VaultError::FolderOwnedByOther(_))
        ));

        delete(&store, "user-1", &folder.id).unwrap();
        assert!(store.get_folder(&folder.id).unwrap().is_none());
        for cipher in store.list_ciphers_by_user("user-1").unwrap() {
            assert_eq!(cipher.folder_id, None);
        }
    }

    #[test]
    fn delete_empty_folder() {
        let store = InMemoryStore::new();
        let folder = create(&store, "user-1", &named("2.Empty"), Utc::now()).unwrap();
        delete(&store, "user-1", &folder.id).unwrap();
        assert!(store.list_folders().unwrap().is_empty());
        assert!(store.list_ciphers().unwrap().is_empty());
    }
}
