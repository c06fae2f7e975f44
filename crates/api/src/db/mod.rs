//! Persistence for users and orders.
//!
//! # Schema: `dairy`
//!
//! ## Tables
//!
//! - `dairy.user` - Accounts (unique index on `lower(email)`)
//! - `dairy.order` - Orders, line items stored as JSONB
//!
//! Handlers and services only see the [`UserStore`] and [`OrderStore`]
//! traits. [`PgUserStore`]/[`PgOrderStore`] back them with `PostgreSQL`;
//! [`MemoryUserStore`]/[`MemoryOrderStore`] keep everything in process.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p dairy-farm-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use dairy_farm_core::{Email, Order, OrderId, OrderStats, UserId, UserRole};

use crate::models::{NewUser, ProfileChanges, User};

pub use memory::{MemoryOrderStore, MemoryUserStore};
pub use orders::PgOrderStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new buyer account.
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is taken
    /// (case-insensitively).
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user and password hash by exact email.
    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError>;

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// Returns [`RepositoryError::NotFound`] for unknown ids and
    /// [`RepositoryError::Conflict`] when the new email is taken.
    async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<User, RepositoryError>;

    /// Change the role of the account with this email (case-insensitive).
    async fn set_role(&self, email: &Email, role: UserRole) -> Result<User, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Order storage. Orders are never deleted.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// All orders of one user, newest first by `order_date`.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Move a `pending` order to `cancelled`.
    ///
    /// Returns `None` when the order does not exist or is no longer pending;
    /// the status is left untouched in that case.
    async fn cancel_if_pending(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    async fn stats(&self) -> Result<OrderStats, RepositoryError>;
}

/// Migrations embedded from `crates/api/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history diverges.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
