//! Sensitive string values
//!
//! Secrets (generated passwords, access keys) are carried in [`SecretString`]
//! so they cannot leak through `Debug`, `Display`, logs, or serialized
//! output. The raw value is only reachable through an explicit
//! [`SecretString::reveal`] call at the point where it is handed to the
//! provider.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Placeholder emitted wherever a secret would otherwise appear.
pub const REDACTED: &str = "[redacted]";

/// A string whose value is redacted everywhere except `reveal()`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying value. Call sites are the audit trail for
    /// where secret material crosses a boundary.
    pub fn reveal(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", REDACTED)
    }
}

// Serialization redacts. A secret that ends up in a run report or a
// rendered diff shows as "[redacted]", never as the value.
impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_returns_value() {
        let secret = SecretString::new("hunter2");
        assert_eq!(secret.reveal(), "hunter2");
    }

    #[test]
    fn test_debug_and_display_redact() {
        let secret = SecretString::new("hunter2");
        assert_eq!(format!("{:?}", secret), "SecretString([redacted])");
        assert_eq!(format!("{}", secret), "[redacted]");
    }

    #[test]
    fn test_serialize_redacts() {
        let secret = SecretString::new("hunter2");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"[redacted]\"");
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_reads_plain_value() {
        let secret: SecretString = serde_json::from_str("\"hunter2\"").unwrap();
        assert_eq!(secret.reveal(), "hunter2");
    }
}
