// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Vault Sync Server - self-hosted Bitwarden-compatible vault synchronization
//!
//! Clients encrypt everything before it leaves the device. The server
//! authenticates them, tracks their devices and stores the opaque vault
//! (folders, items, attachments) so every device sees the same snapshot.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - Access tokens, login sessions and extractors
//! - `codec` - Opaque blob encoding for nested item data
//! - `storage` - Credential store trait with redb and in-memory backends
//! - `vault` - Folder, item, attachment and sync logic

pub mod api;
pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod vault;
