//! Authentication error types.

use thiserror::Error;

use super::token::TokenError;
use crate::db::RepositoryError;
use crate::services::FieldErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more request fields failed validation.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Registration with an email that is already taken.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Profile update to an email owned by someone else.
    #[error("email already exists")]
    EmailTaken,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Only one of current/new password was supplied.
    #[error("current password and new password are both required")]
    PasswordPairRequired,

    /// The current password did not verify.
    #[error("invalid current password")]
    InvalidCurrentPassword,

    /// Token issuing or verification failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
