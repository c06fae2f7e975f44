//! Dairy Farm CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! dairy-cli migrate
//!
//! # Grant the admin role
//! dairy-cli user promote -e owner@example.com
//!
//! # Revoke the admin role
//! dairy-cli user demote -e owner@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use dairy_farm_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "dairy-cli")]
#[command(author, version, about = "Dairy Farm CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user roles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant the admin role
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Return an admin to the buyer role
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::User { action } => match action {
            UserAction::Promote { email } => {
                commands::user::set_role(&email, UserRole::Admin).await
            }
            UserAction::Demote { email } => {
                commands::user::set_role(&email, UserRole::Buyer).await
            }
        },
    }
}
