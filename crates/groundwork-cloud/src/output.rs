//! Stack output values
//!
//! Each stack unit publishes a named map of outputs for downstream
//! consumers. Sensitive entries are a distinct variant, so the
//! plain/secret split is enforced by type at the serialization boundary
//! rather than by convention.

use crate::secret::{REDACTED, SecretString};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single published output value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Plain(String),
    Secret(SecretString),
}

impl OutputValue {
    pub fn plain(value: impl Into<String>) -> Self {
        OutputValue::Plain(value.into())
    }

    pub fn secret(value: impl Into<SecretString>) -> Self {
        OutputValue::Secret(value.into())
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, OutputValue::Secret(_))
    }

    /// The raw value, regardless of sensitivity. The explicit name marks
    /// the call site the same way [`SecretString::reveal`] does.
    pub fn reveal(&self) -> &str {
        match self {
            OutputValue::Plain(value) => value,
            OutputValue::Secret(secret) => secret.reveal(),
        }
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Plain(value) => write!(f, "{value}"),
            OutputValue::Secret(_) => write!(f, "{REDACTED}"),
        }
    }
}

/// Named outputs published by one stack unit.
#[derive(Debug, Clone, Serialize)]
pub struct StackOutputs {
    /// Logical name of the publishing stack
    pub stack: String,

    /// Output values by name, deterministic order
    pub values: BTreeMap<String, OutputValue>,
}

impl StackOutputs {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: OutputValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StackOutputs {
        let mut outputs = StackOutputs::new("storage");
        outputs.set("account_name", OutputValue::plain("pulumi"));
        outputs.set("primary_key", OutputValue::secret("key-material"));
        outputs
    }

    #[test]
    fn test_display_redacts_secrets_only() {
        let outputs = sample();
        assert_eq!(outputs.get("account_name").unwrap().to_string(), "pulumi");
        assert_eq!(outputs.get("primary_key").unwrap().to_string(), "[redacted]");
    }

    #[test]
    fn test_serialization_never_contains_secret_material() {
        let rendered = serde_json::to_string(&sample()).unwrap();
        assert!(rendered.contains("pulumi"));
        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains("key-material"));
    }

    #[test]
    fn test_reveal_reaches_raw_value() {
        let outputs = sample();
        assert!(outputs.get("primary_key").unwrap().is_secret());
        assert_eq!(outputs.get("primary_key").unwrap().reveal(), "key-material");
    }
}
