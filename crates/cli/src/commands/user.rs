//! Account role management.
//!
//! Self-registration only ever creates buyers; admins are promoted here.
//!
//! # Usage
//!
//! ```bash
//! dairy-cli user promote --email owner@example.com
//! dairy-cli user demote --email owner@example.com
//! ```

use dairy_farm_api::db::{PgUserStore, RepositoryError, UserStore};
use dairy_farm_core::{Email, UserRole};

use super::{CliError, connect};

/// Set the role of the account with this email (matched case-insensitively).
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let store = PgUserStore::new(connect().await?);

    let user = store
        .set_role(&email, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(email.to_string()),
            other => CliError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, %role, "Role updated");
    Ok(())
}
