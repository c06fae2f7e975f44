//! Phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Optional `+`, a non-zero leading digit, then 9 to 15 more digits.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9][0-9]{9,15}$").expect("phone pattern is a valid regex")
});

/// Errors that can occur when parsing a [`Phone`].
///
/// The `Display` output is the message shown to API clients.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    /// Empty after trimming.
    #[error("Phone number is required")]
    Empty,
    /// Fewer than [`Phone::MIN_DIGITS`] characters once separators are removed.
    #[error("Phone number must be at least 10 digits")]
    TooShort,
    /// Not a plausible international number.
    #[error("Please enter a valid phone number (minimum 10 digits)")]
    Invalid,
}

/// Strip the separators people type into phone numbers: whitespace,
/// hyphens and parentheses.
///
/// ```
/// use dairy_farm_core::clean_phone;
///
/// assert_eq!(clean_phone("(987) 654-3210"), "9876543210");
/// assert_eq!(clean_phone("+91 98765 43210"), "+919876543210");
/// ```
#[must_use]
pub fn clean_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')')))
        .collect()
}

/// A validated phone number.
///
/// Stores the trimmed input as the user typed it; [`Phone::digits`] gives
/// the cleaned form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum length of the cleaned number.
    pub const MIN_DIGITS: usize = 10;

    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] for the first rule that fails.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let cleaned = clean_phone(s);
        if cleaned.chars().count() < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort);
        }

        if !PHONE_PATTERN.is_match(&cleaned) {
            return Err(PhoneError::Invalid);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as entered (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the phone number and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The number without separators.
    #[must_use]
    pub fn digits(&self) -> String {
        clean_phone(&self.0)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
