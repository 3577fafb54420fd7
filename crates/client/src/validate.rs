//! Name validation.
//!
//! Runs before any network call. A name that fails here never reaches the
//! transport.

use serde::Deserialize;
use thiserror::Error;

/// Default lower bound on name length, in characters.
pub const DEFAULT_MIN_LEN: usize = 1;
/// Default upper bound on name length, in characters.
pub const DEFAULT_MAX_LEN: usize = 50;

/// Length bounds applied to a trimmed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NameRules {
    #[serde(default = "default_min_len", rename = "min_length")]
    pub min_len: usize,
    #[serde(default = "default_max_len", rename = "max_length")]
    pub max_len: usize,
}

fn default_min_len() -> usize {
    DEFAULT_MIN_LEN
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

/// Why a name was rejected.
///
/// The `Display` text is the field-level message shown next to the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("Please enter your name")]
    Empty,

    #[error("Name is too short")]
    TooShort { min: usize },

    #[error("Name is too long (max {max} characters)")]
    TooLong { max: usize },

    #[error("Please use only letters, numbers, spaces, hyphens, and apostrophes")]
    InvalidCharacters { found: char },
}

/// A trimmed name that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidName(String);

impl ValidName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ValidName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.')
}

/// Validate a raw name against the given rules.
pub fn validate(raw: &str, rules: &NameRules) -> Result<ValidName, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = name.chars().count();
    if len < rules.min_len {
        return Err(ValidationError::TooShort { min: rules.min_len });
    }
    if len > rules.max_len {
        return Err(ValidationError::TooLong { max: rules.max_len });
    }

    if let Some(found) = name.chars().find(|c| !is_allowed(*c)) {
        return Err(ValidationError::InvalidCharacters { found });
    }

    Ok(ValidName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(raw: &str) -> Result<ValidName, ValidationError> {
        validate(raw, &NameRules::default())
    }

    #[test]
    fn accepts_allowed_names() {
        let longest = "x".repeat(50);
        for name in [
            "Ada",
            "a",
            "Mary-Jane O'Neil",
            "J. R. R. Tolkien",
            "user123",
            "42",
            "'.-",
            longest.as_str(),
        ] {
            assert_eq!(check(name).unwrap().as_str(), name, "{name:?}");
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(check("  Ada Lovelace \n").unwrap().as_str(), "Ada Lovelace");
    }

    #[test]
    fn empty_and_blank_are_empty() {
        assert_eq!(check(""), Err(ValidationError::Empty));
        assert_eq!(check("   "), Err(ValidationError::Empty));
        assert_eq!(check("\t\n"), Err(ValidationError::Empty));
    }

    #[test]
    fn rejects_long_names() {
        let err = check(&"a".repeat(51)).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { max: 50 });
        assert_eq!(err.to_string(), "Name is too long (max 50 characters)");
    }

    #[test]
    fn length_is_measured_after_trimming() {
        let padded = format!("  {}  ", "a".repeat(50));
        assert!(check(&padded).is_ok());
    }

    #[test]
    fn rejects_disallowed_characters() {
        assert_eq!(
            check("John@Doe"),
            Err(ValidationError::InvalidCharacters { found: '@' })
        );
        assert!(matches!(
            check("Zoë"),
            Err(ValidationError::InvalidCharacters { found: 'ë' })
        ));
        assert!(matches!(
            check("a\tb"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn custom_min_length() {
        let rules = NameRules {
            min_len: 3,
            max_len: 50,
        };
        assert_eq!(
            validate("Al", &rules),
            Err(ValidationError::TooShort { min: 3 })
        );
        assert!(validate("Ada", &rules).is_ok());
    }

    #[test]
    fn length_check_precedes_character_check() {
        let name = "@".repeat(51);
        assert_eq!(check(&name), Err(ValidationError::TooLong { max: 50 }));
    }
}
