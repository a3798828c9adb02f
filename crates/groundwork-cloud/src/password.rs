//! Generated administrative credentials

use crate::error::{CloudError, Result};
use crate::secret::SecretString;
use rand::Rng;
use rand::seq::SliceRandom;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!#$%&*()-_=+[]{}<>:?";

/// Character-class policy for a generated password.
///
/// Every enabled class is guaranteed to appear at least once in the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 20,
            lower: true,
            upper: true,
            digits: true,
            special: true,
        }
    }
}

impl PasswordPolicy {
    fn classes(&self) -> Vec<&'static [u8]> {
        let mut classes = Vec::new();
        if self.lower {
            classes.push(LOWER);
        }
        if self.upper {
            classes.push(UPPER);
        }
        if self.digits {
            classes.push(DIGITS);
        }
        if self.special {
            classes.push(SPECIAL);
        }
        classes
    }

    /// Generate a fresh password satisfying the policy.
    pub fn generate(&self) -> Result<SecretString> {
        let classes = self.classes();
        if classes.is_empty() {
            return Err(CloudError::InvalidConfig(
                "password policy enables no character classes".to_string(),
            ));
        }
        if self.length < classes.len() {
            return Err(CloudError::InvalidConfig(format!(
                "password length {} cannot cover {} required character classes",
                self.length,
                classes.len()
            )));
        }

        let mut rng = rand::thread_rng();
        let alphabet: Vec<u8> = classes.concat();

        // One draw per required class, the remainder from the full alphabet.
        let mut chars: Vec<u8> = classes
            .iter()
            .map(|class| class[rng.gen_range(0..class.len())])
            .collect();
        while chars.len() < self.length {
            chars.push(alphabet[rng.gen_range(0..alphabet.len())]);
        }
        chars.shuffle(&mut rng);

        let value = String::from_utf8(chars)
            .map_err(|e| CloudError::InvalidConfig(format!("non-utf8 password: {e}")))?;
        Ok(SecretString::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_length_and_classes() {
        let password = PasswordPolicy::default().generate().unwrap();
        let value = password.reveal();
        assert_eq!(value.len(), 20);
        assert!(value.bytes().any(|b| LOWER.contains(&b)));
        assert!(value.bytes().any(|b| UPPER.contains(&b)));
        assert!(value.bytes().any(|b| DIGITS.contains(&b)));
        assert!(value.bytes().any(|b| SPECIAL.contains(&b)));
    }

    #[test]
    fn test_two_runs_differ() {
        let policy = PasswordPolicy::default();
        let first = policy.generate().unwrap();
        let second = policy.generate().unwrap();
        // 20 chars over a ~76 symbol alphabet; a collision means the RNG is broken.
        assert_ne!(first.reveal(), second.reveal());
    }

    #[test]
    fn test_length_too_short_for_classes() {
        let policy = PasswordPolicy {
            length: 2,
            ..PasswordPolicy::default()
        };
        assert!(policy.generate().is_err());
    }

    #[test]
    fn test_no_classes_enabled() {
        let policy = PasswordPolicy {
            length: 20,
            lower: false,
            upper: false,
            digits: false,
            special: false,
        };
        assert!(policy.generate().is_err());
    }

    #[test]
    fn test_single_class_policy() {
        let policy = PasswordPolicy {
            length: 8,
            lower: true,
            upper: false,
            digits: false,
            special: false,
        };
        let password = policy.generate().unwrap();
        assert!(password.reveal().bytes().all(|b| LOWER.contains(&b)));
    }
}
