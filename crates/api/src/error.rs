//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error body is `{message, errors?}`.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::FieldErrors;
use crate::services::auth::{AuthError, TokenError};
use crate::services::orders::OrderError;

const SERVER_ERROR: &str = "Server error";
const EMAIL_TAKEN: &str = "Email already exists. Please use a different email.";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication or profile operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Bearer token missing or rejected.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    /// Body was not valid JSON for the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    fn with_errors(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            message: message.into(),
            errors: Some(errors),
        }
    }

    fn email_taken(message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_owned(), EMAIL_TAKEN.to_owned());
        Self::with_errors(message, errors)
    }

    fn server() -> Self {
        Self::new(SERVER_ERROR)
    }
}

fn token_parts(err: &TokenError) -> (StatusCode, ErrorBody) {
    let message = match err {
        TokenError::Missing => "No token, authorization denied",
        TokenError::Expired => "Token expired, please login again",
        TokenError::Invalid => "Invalid token, authorization denied",
        TokenError::Revoked => "Token has been revoked, please login again",
        TokenError::Internal(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::server());
        }
    };
    (StatusCode::UNAUTHORIZED, ErrorBody::new(message))
}

impl AppError {
    /// Status code and client-facing body. Never includes internal details.
    fn parts(self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_errors("Validation failed", errors),
                ),
                AuthError::UserAlreadyExists => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::email_taken("User already exists"),
                ),
                AuthError::EmailTaken => {
                    (StatusCode::BAD_REQUEST, ErrorBody::email_taken(EMAIL_TAKEN))
                }
                AuthError::InvalidCredentials => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("Invalid credentials"),
                ),
                AuthError::UserNotFound => {
                    (StatusCode::NOT_FOUND, ErrorBody::new("User not found"))
                }
                AuthError::PasswordPairRequired => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("Current password and new password are both required"),
                ),
                AuthError::InvalidCurrentPassword => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("Invalid current password"),
                ),
                AuthError::Token(err) => token_parts(&err),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::server())
                }
            },
            Self::Order(err) => match err {
                OrderError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_errors("Validation error", errors),
                ),
                OrderError::NotFound | OrderError::UserNotFound => {
                    (StatusCode::NOT_FOUND, ErrorBody::new(err.to_string()))
                }
                OrderError::NotOwner => (StatusCode::FORBIDDEN, ErrorBody::new(err.to_string())),
                OrderError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::server())
                }
                OrderError::ItemsRequired
                | OrderError::AddressAndDateRequired
                | OrderError::MissingAddressField(_)
                | OrderError::PhoneTooShort
                | OrderError::InvalidDeliveryDate
                | OrderError::DeliveryDateInPast
                | OrderError::NotCancellable => {
                    (StatusCode::BAD_REQUEST, ErrorBody::new(err.to_string()))
                }
            },
            Self::Token(err) => token_parts(&err),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::server()),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, ErrorBody::new(message)),
            Self::InvalidBody(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Invalid request body"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if is_server_error(&self) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Token(_) | Self::Auth(AuthError::Token(_)) = &self {
            tracing::warn!(error = %self, "Request rejected");
        } else if let Self::InvalidBody(rejection) = &self {
            tracing::debug!(error = %rejection, "Malformed request body");
        }

        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

fn is_server_error(err: &AppError) -> bool {
    match err {
        AppError::Database(_) => true,
        AppError::Token(token) | AppError::Auth(AuthError::Token(token)) => {
            matches!(token, TokenError::Internal(_))
        }
        AppError::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        | AppError::Order(OrderError::Repository(_)) => true,
        _ => false,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON body extractor whose rejection is an [`AppError`].
///
/// Malformed or mistyped bodies become `400 {"message": "Invalid request body"}`
/// instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
