// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Operations
//!
//! Folder, item and attachment operations on behalf of an authenticated
//! user, plus the full-sync snapshot. Every operation goes through the
//! [`CredentialStore`](crate::storage::CredentialStore); render objects are
//! built here from stored records.
//!
//! ## Ownership
//!
//! | Operation | Checks |
//! |-----------|--------|
//! | item create | folder (if any) exists and is the caller's |
//! | item update | item exists and is the caller's; folder as above |
//! | item delete | item exists and is the caller's |
//! | folder update / delete | folder exists and is the caller's |
//! | attachment fetch / delete | item is the caller's; attachment is the item's |
//! | attachment add | item exists (ownership checked by the handler) |

pub mod attachments;
pub mod ciphers;
pub mod error;
pub mod folders;
pub mod sync;

pub use error::VaultError;

use chrono::{DateTime, SecondsFormat, Utc};

/// `RevisionDate` format: RFC 3339, whole seconds, `Z` suffix.
pub fn revision_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Treat an empty client string as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn revision_dates_have_second_precision() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
            + chrono::Duration::milliseconds(535);
        assert_eq!(revision_date(at), "2026-03-14T15:09:26Z");
    }

    #[test]
    fn empty_strings_are_absent() {
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("f-1")), Some("f-1".to_string()));
    }
}
