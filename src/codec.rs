// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Blob Codec
//!
//! Conversion between opaque stored byte strings and the JSON values the
//! clients send and expect back. The server never looks inside these values:
//! login, card, identity, fields, notes and password history are all stored
//! as raw bytes and only decoded when a render object is built.
//!
//! ## Absent vs empty
//!
//! Every function here maps "nothing" to `None`:
//!
//! - `decode_*(None)` and `decode_*` of zero bytes yield `None`
//! - `encode_value` of JSON `null` yields `None`
//! - `encode_list` of an empty list yields `None`
//!
//! Clients render a missing field differently from an empty array, so an
//! empty list is never written back as `[]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque JSON value as stored by the credential store.
///
/// The bytes are whatever the client sent, re-serialized once at the
/// boundary. Nothing inside is interpreted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(Vec<u8>);

impl Blob {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Stored bytes read as UTF-8, for blobs that hold client strings
    /// verbatim (folder names, key material).
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Blob {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for Blob {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

/// Encode a single JSON value. `None` and `null` encode to `None`.
pub fn encode_value(value: Option<&Value>) -> Option<Blob> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::to_vec(value) {
            Ok(bytes) => Some(Blob(bytes)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode opaque value, storing none");
                None
            }
        },
    }
}

/// Encode a list of JSON values. An absent or empty list encodes to `None`.
pub fn encode_list(values: Option<&[Value]>) -> Option<Blob> {
    match values {
        Some(values) if !values.is_empty() => match serde_json::to_vec(values) {
            Ok(bytes) => Some(Blob(bytes)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode opaque list, storing none");
                None
            }
        },
        _ => None,
    }
}

/// Decode a stored value. Absent, empty or undecodable bytes yield `None`.
pub fn decode_value(blob: Option<&Blob>) -> Option<Value> {
    let blob = blob.filter(|b| !b.is_empty())?;
    match serde_json::from_slice::<Value>(blob.as_bytes()) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, len = blob.0.len(), "Stored opaque value is not JSON");
            None
        }
    }
}

/// Decode a stored list. Absent, empty or undecodable bytes yield `None`.
///
/// A stored empty list (written by an older server) also decodes to `None`,
/// so the absent/empty asymmetry holds in both directions.
pub fn decode_list(blob: Option<&Blob>) -> Option<Vec<Value>> {
    let blob = blob.filter(|b| !b.is_empty())?;
    match serde_json::from_slice::<Option<Vec<Value>>>(blob.as_bytes()) {
        Ok(Some(values)) if !values.is_empty() => Some(values),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, len = blob.0.len(), "Stored opaque list is not a JSON array");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_list_round_trips_to_none() {
        let encoded = encode_list(Some(&[]));
        assert!(encoded.is_none());
        assert_eq!(decode_list(encoded.as_ref()), None);
    }

    #[test]
    fn null_and_absent_round_trip_to_none() {
        assert_eq!(decode_value(encode_value(None).as_ref()), None);
        assert_eq!(decode_value(encode_value(Some(&Value::Null)).as_ref()), None);
        assert_eq!(decode_list(encode_list(None).as_ref()), None);
    }

    #[test]
    fn decode_never_fails_on_empty_or_garbage() {
        let empty = Blob::from_bytes(Vec::new());
        assert_eq!(decode_value(Some(&empty)), None);
        assert_eq!(decode_list(Some(&empty)), None);

        let garbage = Blob::from("not json {");
        assert_eq!(decode_value(Some(&garbage)), None);
        assert_eq!(decode_list(Some(&garbage)), None);

        // An object where a list is expected is treated as absent.
        let object = Blob::from(r#"{"a":1}"#);
        assert_eq!(decode_list(Some(&object)), None);
    }

    #[test]
    fn values_are_preserved_verbatim() {
        let login = json!({
            "Username": "2.abc|def|ghi",
            "Password": "2.jkl|mno|pqr",
            "Uris": null,
        });
        let blob = encode_value(Some(&login)).expect("non-null value encodes");
        assert_eq!(decode_value(Some(&blob)), Some(login));

        let fields = vec![json!({"Name": "2.x|y|z", "Type": 0})];
        let blob = encode_list(Some(&fields)).expect("non-empty list encodes");
        assert_eq!(decode_list(Some(&blob)), Some(fields));
    }

    #[test]
    fn empty_string_is_a_value_not_an_absence() {
        let notes = json!("");
        let blob = encode_value(Some(&notes)).expect("empty string is a value");
        assert_eq!(decode_value(Some(&blob)), Some(notes));
    }

    #[test]
    fn stored_empty_array_decodes_to_none() {
        let blob = Blob::from("[]");
        assert_eq!(decode_list(Some(&blob)), None);
    }
}
