//! Password strength rules.
//!
//! Passwords are never stored or wrapped in a type here; this module only
//! decides whether a candidate is acceptable. Hashing happens in the API
//! crate.

/// Characters that satisfy the "special character" rule.
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reasons a password is rejected.
///
/// The `Display` output is the message shown to API clients.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password is required")]
    Empty,
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one number")]
    MissingDigit,
    #[error("Password must contain at least one special character (@$!%*?&)")]
    MissingSpecial,
}

/// Check a password against the strength policy.
///
/// A password is accepted iff it has at least 8 characters and contains at
/// least one ASCII lowercase letter, one ASCII uppercase letter, one ASCII
/// digit and one of `@$!%*?&`.
///
/// # Errors
///
/// Returns the first rule the password fails, in the order listed above.
///
/// ```
/// use dairy_farm_core::{PasswordError, validate_password_strength};
///
/// assert!(validate_password_strength("Sunny@Farm1").is_ok());
/// assert_eq!(
///     validate_password_strength("sunnyfarm1@"),
///     Err(PasswordError::MissingUppercase)
/// );
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(PasswordError::MissingSpecial);
    }
    Ok(())
}
