// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Storage
//!
//! All persistent state (users, devices, folders, items and attachments)
//! goes through the [`CredentialStore`] trait. Two adapters are provided:
//!
//! - [`RedbStore`]: single-file embedded database under `DATA_DIR`
//! - [`InMemoryStore`]: volatile, for local runs and tests
//!
//! ## Layout on disk
//!
//! ```text
//! $DATA_DIR/
//!   vault.redb    # every table, including attachment bytes
//! ```

pub mod database;
pub mod error;
pub mod memory;
pub mod ownership;
pub mod records;
pub mod repository;

#[cfg(test)]
pub(crate) mod conformance;

use std::path::Path;
use std::sync::Arc;

pub use database::{RedbStore, DATABASE_FILE};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use ownership::OwnedResource;
pub use records::{
    SessionState, StoredAttachment, StoredCipher, StoredDevice, StoredFolder, StoredUser,
};
pub use repository::CredentialStore;

use crate::config::StoreBackend;

/// Open the configured backend.
pub fn open_store(
    backend: StoreBackend,
    data_dir: &Path,
) -> StorageResult<Arc<dyn CredentialStore>> {
    match backend {
        StoreBackend::Redb => {
            let path = data_dir.join(DATABASE_FILE);
            tracing::info!(path = %path.display(), "Opening redb credential store");
            Ok(Arc::new(RedbStore::open(&path)?))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory credential store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
