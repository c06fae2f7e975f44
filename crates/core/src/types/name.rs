//! Person name type (first or last name).

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name pattern is a valid regex"));

/// Errors that can occur when parsing a [`PersonName`].
///
/// Messages need the field label ("First name", "Last name"), so use
/// [`NameError::message`] to build the client-facing text.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    /// Empty after trimming.
    #[error("name is required")]
    Empty,
    /// Fewer than [`PersonName::MIN_LENGTH`] characters.
    #[error("name is too short")]
    TooShort,
    /// Contains something other than ASCII letters and spaces.
    #[error("name contains invalid characters")]
    InvalidCharacters,
}

impl NameError {
    /// Client-facing message for the given field label.
    #[must_use]
    pub fn message(self, label: &str) -> String {
        match self {
            Self::Empty => format!("{label} is required"),
            Self::TooShort => format!(
                "{label} must be at least {} characters",
                PersonName::MIN_LENGTH
            ),
            Self::InvalidCharacters => format!("{label} can only contain letters and spaces"),
        }
    }
}

/// A first or last name: trimmed, at least two characters, letters and
/// spaces only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Minimum number of characters after trimming.
    pub const MIN_LENGTH: usize = 2;

    /// Parse a name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] describing the first rule that fails.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(NameError::Empty);
        }

        if s.chars().count() < Self::MIN_LENGTH {
            return Err(NameError::TooShort);
        }

        if !NAME_PATTERN.is_match(s) {
            return Err(NameError::InvalidCharacters);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(PersonName::parse("Jo").unwrap().as_str(), "Jo");
        assert_eq!(PersonName::parse("  Mary Ann ").unwrap().as_str(), "Mary Ann");
    }

    #[test]
    fn test_empty() {
        assert_eq!(PersonName::parse(""), Err(NameError::Empty));
        assert_eq!(PersonName::parse("   "), Err(NameError::Empty));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(PersonName::parse(" A "), Err(NameError::TooShort));
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(PersonName::parse("R2D2"), Err(NameError::InvalidCharacters));
        assert_eq!(PersonName::parse("O'Brien"), Err(NameError::InvalidCharacters));
        assert_eq!(PersonName::parse("Anne-Marie"), Err(NameError::InvalidCharacters));
    }

    #[test]
    fn test_messages_use_label() {
        assert_eq!(NameError::Empty.message("First name"), "First name is required");
        assert_eq!(
            NameError::TooShort.message("Last name"),
            "Last name must be at least 2 characters"
        );
        assert_eq!(
            NameError::InvalidCharacters.message("First name"),
            "First name can only contain letters and spaces"
        );
    }
}
