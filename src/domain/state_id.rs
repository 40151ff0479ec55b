//! Composite state identifiers
//!
//! Terraform keeps a single opaque string ID per resource, while most Atlas
//! sub-resources are addressed by several path parameters at once
//! (project, cluster, snapshot...). A [`StateId`] packs those named fields
//! into one string and unpacks them again.
//!
//! Encoding: every key and value is base64 (standard alphabet, padded),
//! each pair is written `key:value`, and pairs are joined with `-` in key
//! order. The base64 alphabet contains neither separator, so any value
//! round-trips without escaping rules.
//!
//! ```
//! use mongodbatlas::domain::StateId;
//!
//! let id = StateId::new()
//!     .with("project_id", "5d0f1f73cf09a29120e173cf")
//!     .with("cluster_name", "my-cluster")
//!     .encode();
//!
//! let decoded = StateId::decode(&id);
//! assert_eq!(decoded.get("cluster_name"), Some("my-cluster"));
//! ```

use crate::domain::{ProviderError, Result};
use base64::{engine::general_purpose, Engine as _};
use std::collections::BTreeMap;
use std::fmt;

const PAIR_SEPARATOR: char = '-';
const KEY_VALUE_SEPARATOR: char = ':';

/// Ordered set of named string fields making up one resource ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateId {
    fields: BTreeMap<String, String>,
}

impl StateId {
    /// Creates an empty ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous value for the same key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the value of a field, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the value of a field that the caller cannot work without
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidStateId`] when the field is missing
    /// or empty, which is how a malformed ID surfaces to the user.
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ProviderError::InvalidStateId(format!(
                "missing field '{key}'"
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes all fields into one opaque string
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}{KEY_VALUE_SEPARATOR}{}",
                    general_purpose::STANDARD.encode(key),
                    general_purpose::STANDARD.encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join(&PAIR_SEPARATOR.to_string())
    }

    /// Parses an encoded ID
    ///
    /// Decoding is best-effort: segments that are not `key:value` or do not
    /// hold valid base64 UTF-8 are skipped with a warning, so a malformed ID
    /// yields a partial mapping. Callers check for the fields they need with
    /// [`StateId::require`].
    pub fn decode(id: &str) -> Self {
        let mut decoded = Self::new();

        for segment in id.split(PAIR_SEPARATOR).filter(|s| !s.is_empty()) {
            let Some((key, value)) = segment.split_once(KEY_VALUE_SEPARATOR) else {
                tracing::warn!(segment = %segment, "Skipping state ID segment without key/value separator");
                continue;
            };

            match (decode_part(key), decode_part(value)) {
                (Some(key), Some(value)) => decoded.insert(key, value),
                _ => {
                    tracing::warn!(segment = %segment, "Error decoding state ID segment");
                }
            }
        }

        decoded
    }
}

fn decode_part(part: &str) -> Option<String> {
    let bytes = general_purpose::STANDARD.decode(part).ok()?;
    String::from_utf8(bytes).ok()
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StateId {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut id = Self::new();
        for (key, value) in iter {
            id.insert(key, value);
        }
        id
    }
}

impl From<BTreeMap<String, String>> for StateId {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

impl From<StateId> for BTreeMap<String, String> {
    fn from(id: StateId) -> Self {
        id.fields
    }
}

/// Encodes a set of fields into a state ID string
pub fn encode_state_id<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> String
where
    K: Into<String>,
    V: Into<String>,
{
    fields.into_iter().collect::<StateId>().encode()
}

/// Decodes a state ID string, see [`StateId::decode`]
pub fn decode_state_id(id: &str) -> StateId {
    StateId::decode(id)
}
