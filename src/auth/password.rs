// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Master password verification.
//!
//! Clients derive the master password hash locally and send it as is, so
//! verification is an exact comparison of the stored and supplied values.

use subtle::ConstantTimeEq;

/// Constant-time comparison of the stored hash with the supplied one.
pub fn verify_password(stored: &str, supplied: &str) -> bool {
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        assert!(verify_password("hash==", "hash=="));
        assert!(!verify_password("hash==", "hash="));
        assert!(!verify_password("hash==", "HASH=="));
        assert!(!verify_password("hash==", ""));
    }
}
