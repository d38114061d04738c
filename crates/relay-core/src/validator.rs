//! Username validation

use crate::error::{RelayError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("username pattern is a valid regex")
});

/// Whether `candidate` can be used as a provider username
///
/// Accepts non-empty ASCII strings made of letters, digits, `_` and `-`.
pub fn validate(candidate: &str) -> bool {
    USERNAME_PATTERN.is_match(candidate)
}

/// A username that passed [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate `candidate` after trimming surrounding whitespace
    pub fn parse(candidate: &str) -> Result<Self> {
        let trimmed = candidate.trim();
        if validate(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(RelayError::ValidationError(candidate.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_username_alphabet() {
        for name in ["rj", "RJ", "user_01", "a-b-c", "_", "-", "0", "Some_User-2024"] {
            assert!(validate(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_rejects_everything_else() {
        for name in [
            "", " ", "rj ", "two words", "/start", "user!", "ünïcode", "name.with.dots",
            "tab\tname", "line\nbreak", "<b>", "a@b",
        ] {
            assert!(!validate(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_every_allowed_char_alone_is_valid() {
        let allowed = ('a'..='z')
            .chain('A'..='Z')
            .chain('0'..='9')
            .chain(['_', '-']);
        for c in allowed {
            assert!(validate(&c.to_string()));
            assert!(validate(&c.to_string().repeat(15)));
        }
    }

    #[test]
    fn test_any_disallowed_char_spoils_the_name() {
        for c in (' '..='~').filter(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-') {
            assert!(!validate(&format!("rj{c}")), "{c:?} should be rejected");
            assert!(!validate(&c.to_string()));
        }
    }

    #[test]
    fn test_username_parse_trims() {
        let name = Username::parse("  rj\n").unwrap();
        assert_eq!(name.as_str(), "rj");
        assert_eq!(name.to_string(), "rj");
    }

    #[test]
    fn test_username_parse_rejects() {
        let err = Username::parse("r j").unwrap_err();
        assert_eq!(err, RelayError::ValidationError("r j".to_string()));
        assert!(Username::parse("   ").is_err());
    }
}
