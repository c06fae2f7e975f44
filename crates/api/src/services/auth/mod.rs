//! Authentication service.
//!
//! Registration, login, logout and self-service profile management. Inputs
//! arrive as loosely typed request bodies; every field is validated here and
//! failures are reported per field before anything is written.

mod error;
pub mod revocation;
pub mod token;

pub use error::AuthError;
pub use revocation::RevocationList;
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use dairy_farm_core::{Email, PersonName, Phone, UserId, validate_password_strength};

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, ProfileChanges, User};
use crate::services::FieldErrors;

/// Hash checked against when the email is unknown, so both login failures
/// cost one Argon2 verification.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dairy-farm-unknown-account").ok());

/// Body of `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `PUT /api/auth/profile`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Body of `PUT /api/auth/change-password`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tokens: &'a TokenIssuer,
    revoked: &'a RevocationList,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        tokens: &'a TokenIssuer,
        revoked: &'a RevocationList,
    ) -> Self {
        Self {
            users,
            tokens,
            revoked,
        }
    }

    /// Register a new buyer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with one message per failing field,
    /// or `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();

        let first_name = check(
            &mut errors,
            "firstName",
            PersonName::parse(field(req.first_name.as_deref())).map_err(|e| e.message("First name")),
        );
        let last_name = check(
            &mut errors,
            "lastName",
            PersonName::parse(field(req.last_name.as_deref())).map_err(|e| e.message("Last name")),
        );
        let email = check(&mut errors, "email", Email::parse(field(req.email.as_deref())));
        let phone = check(&mut errors, "phone", Phone::parse(field(req.phone.as_deref())));
        let password = field(req.password.as_deref());
        check(&mut errors, "password", validate_password_strength(password));

        let (Some(first_name), Some(last_name), Some(email), Some(phone), true) =
            (first_name, last_name, email, phone, errors.is_empty())
        else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                first_name,
                last_name,
                email,
                phone,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password, returning a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email or missing
    /// password, and `AuthError::InvalidCredentials` when the email is unknown
    /// or the password is wrong.
    pub async fn login(&self, req: LoginRequest) -> Result<(IssuedToken, User), AuthError> {
        let mut errors = FieldErrors::new();

        let email = check(&mut errors, "email", Email::parse(field(req.email.as_deref())));
        let password = field(req.password.as_deref());
        if password.is_empty() {
            errors.insert("password".to_owned(), "Password is required".to_owned());
        }

        let (Some(email), true) = (email, errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            tracing::warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &password_hash).is_err() {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id, user.role)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok((issued, user))
    }

    /// Revoke the presented token until it expires.
    pub async fn logout(&self, claims: &Claims) {
        self.revoked.revoke(claims).await;
        tracing::info!(user_id = %claims.id, "User logged out");
    }

    /// Fetch the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Partially update the caller's profile, optionally changing the password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for invalid provided fields,
    /// `AuthError::PasswordPairRequired` if only one password field is given,
    /// `AuthError::InvalidCurrentPassword` if the current password is wrong,
    /// and `AuthError::EmailTaken` if the new email belongs to someone else.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        req: UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();
        let mut changes = ProfileChanges::default();

        if let Some(value) = req.first_name.as_deref() {
            changes.first_name = check(
                &mut errors,
                "firstName",
                PersonName::parse(value).map_err(|e| e.message("First name")),
            );
        }
        if let Some(value) = req.last_name.as_deref() {
            changes.last_name = check(
                &mut errors,
                "lastName",
                PersonName::parse(value).map_err(|e| e.message("Last name")),
            );
        }
        if let Some(value) = req.email.as_deref() {
            changes.email = check(&mut errors, "email", Email::parse(value));
        }
        if let Some(value) = req.phone.as_deref() {
            changes.phone = check(&mut errors, "phone", Phone::parse(value));
        }

        let passwords = password_pair(
            req.current_password.as_deref(),
            req.new_password.as_deref(),
        )?;
        if let Some((_, new_password)) = passwords {
            check(
                &mut errors,
                "newPassword",
                validate_password_strength(new_password),
            );
        }

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        if let Some((current_password, new_password)) = passwords {
            self.verify_current_password(user_id, current_password)
                .await?;
            changes.password_hash = Some(hash_password(new_password)?);
        }

        if changes.is_empty() {
            return self.profile(user_id).await;
        }

        let password_changed = changes.password_hash.is_some();
        let user = self
            .users
            .update_profile(user_id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, password_changed, "Profile updated");
        Ok(user)
    }

    /// Replace the caller's password.
    ///
    /// # Errors
    ///
    /// Same password rules as [`AuthService::update_profile`].
    pub async fn change_password(
        &self,
        user_id: UserId,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let Some((current_password, new_password)) = password_pair(
            req.current_password.as_deref(),
            req.new_password.as_deref(),
        )?
        else {
            return Err(AuthError::PasswordPairRequired);
        };

        if let Err(e) = validate_password_strength(new_password) {
            let mut errors = FieldErrors::new();
            errors.insert("newPassword".to_owned(), e.to_string());
            return Err(AuthError::Validation(errors));
        }

        self.verify_current_password(user_id, current_password)
            .await?;

        let changes = ProfileChanges {
            password_hash: Some(hash_password(new_password)?),
            ..ProfileChanges::default()
        };
        self.users
            .update_profile(user_id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn verify_current_password(
        &self,
        user_id: UserId,
        current_password: &str,
    ) -> Result<(), AuthError> {
        let hash = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current_password, &hash).map_err(|_| {
            tracing::warn!(user_id = %user_id, "Current password did not verify");
            AuthError::InvalidCurrentPassword
        })
    }
}

/// Treat a missing field as empty so the "required" rule reports it.
fn field(value: Option<&str>) -> &str {
    value.unwrap_or_default()
}

/// Record a field failure and pass successes through.
fn check<T, E: ToString>(
    errors: &mut FieldErrors,
    name: &str,
    result: Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.insert(name.to_owned(), e.to_string());
            None
        }
    }
}

/// `None` when neither password is given, both when both are.
fn password_pair<'r>(
    current: Option<&'r str>,
    new: Option<&'r str>,
) -> Result<Option<(&'r str, &'r str)>, AuthError> {
    let current = current.filter(|s| !s.is_empty());
    let new = new.filter(|s| !s.is_empty());

    match (current, new) {
        (None, None) => Ok(None),
        (Some(current), Some(new)) => Ok(Some((current, new))),
        _ => Err(AuthError::PasswordPairRequired),
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
