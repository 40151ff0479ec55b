//! Atlas credentials held in memory
//!
//! The private API key and the access token are wrapped in
//! [`secrecy::Secret`], zeroed on drop and redacted from `Debug` output.
//! The raw value is only read through `expose_secret()` when a request is
//! authenticated.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

const REDACTED: &str = "[REDACTED]";

/// A credential string, wiped from memory when dropped
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renders the raw value for HTTP auth headers
impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dumped configuration never carries credentials
impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// A private API key or access token
pub type SecretString = Secret<SecretValue>;

/// Wraps a credential read from config or the environment
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue(value))
}
