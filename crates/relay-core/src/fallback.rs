//! Last-resort rendering for payloads no schema recognized.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::Result;

/// A flat JSON object whose values are all strings.
///
/// Backed by a `BTreeMap` so rendering is ordered by key regardless of the
/// order the producer sent them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct GenericFields(BTreeMap<String, String>);

impl GenericFields {
    /// Decodes `buf` as a string-to-string map.
    ///
    /// # Errors
    ///
    /// Fails if `buf` is not a JSON object or any value is not a string.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(buf)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `"<key>: <value>\n"` per entry, keys ascending.
    #[must_use]
    pub fn message(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}: {value}\n"))
            .collect()
    }
}

/// Renders `buf` as a sorted key/value dump.
///
/// # Errors
///
/// Returns [`RelayError::Decode`](crate::RelayError::Decode) if `buf` is not
/// a flat string-valued JSON object.
pub fn fallback(buf: &[u8]) -> Result<String> {
    GenericFields::parse(buf).map(|fields| fields.message())
}
