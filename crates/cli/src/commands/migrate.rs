//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! dairy-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DAIRY_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/api/migrations/` and are embedded into the
//! binary at build time.

use dairy_farm_api::db::{MIGRATOR, run_migrations};

use super::{CliError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!(
        available = MIGRATOR.iter().count(),
        "Running migrations..."
    );
    run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
