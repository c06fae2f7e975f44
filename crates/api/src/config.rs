//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DAIRY_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`). Not needed with `DAIRY_STORAGE=memory`.
//! - `DAIRY_JWT_SECRET` - Token signing secret (falls back to `JWT_SECRET`).
//!   Required in production (min 32 chars, high entropy); in development a
//!   fixed development secret is used when unset.
//!
//! ## Optional
//! - `DAIRY_HOST` - Bind address (default: 127.0.0.1)
//! - `DAIRY_PORT` - Listen port (default: 5000)
//! - `DAIRY_ENV` - `development` (default) or `production`
//! - `DAIRY_STORAGE` - `postgres` (default) or `memory`. The in-memory store
//!   forgets everything on restart and is refused in production.
//! - `DAIRY_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `DAIRY_RATE_LIMIT` - `true` (default) or `false`
//! - `DAIRY_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Signing secret used in development when none is configured.
const DEV_JWT_SECRET: &str = "dairy-farm-development-only-signing-key";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

/// Where users and orders are kept.
#[derive(Clone)]
pub enum Storage {
    Postgres { database_url: SecretString },
    Memory,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres { .. } => f.write_str("Postgres([REDACTED])"),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got {other}")),
        }
    }
}

/// API application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Store backend; the `PostgreSQL` URL contains a password
    pub storage: Storage,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub environment: Environment,
    /// HS256 token signing secret
    pub jwt_secret: SecretString,
    /// True when `jwt_secret` is the built-in development secret
    pub jwt_secret_is_default: bool,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_origins: Option<Vec<String>>,
    pub rate_limit: bool,
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("storage", &self.storage)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_secret_is_default", &self.jwt_secret_is_default)
            .field("cors_origins", &self.cors_origins)
            .field("rate_limit", &self.rate_limit)
            .field("log_format", &self.log_format)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the production signing secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parse_or("DAIRY_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("DAIRY_PORT", 5000_u16)?;
        let environment = env.parse_or("DAIRY_ENV", Environment::Development)?;

        let storage = match env.get("DAIRY_STORAGE").as_deref().map(str::trim) {
            None | Some("postgres") => {
                let database_url = env
                    .first_of(&["DAIRY_DATABASE_URL", "DATABASE_URL"])
                    .map(SecretString::from)
                    .ok_or_else(|| ConfigError::MissingEnvVar("DAIRY_DATABASE_URL".to_owned()))?;
                Storage::Postgres { database_url }
            }
            Some("memory") if environment.is_production() => {
                return Err(ConfigError::InvalidEnvVar(
                    "DAIRY_STORAGE".to_owned(),
                    "memory storage is not allowed in production".to_owned(),
                ));
            }
            Some("memory") => Storage::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "DAIRY_STORAGE".to_owned(),
                    format!("expected postgres or memory, got {other}"),
                ));
            }
        };

        let (jwt_secret, jwt_secret_is_default) =
            match env.first_of(&["DAIRY_JWT_SECRET", "JWT_SECRET"]) {
                Some(value) => {
                    if environment.is_production() {
                        validate_jwt_secret(&value, "DAIRY_JWT_SECRET")?;
                    }
                    (SecretString::from(value), false)
                }
                None if environment.is_production() => {
                    return Err(ConfigError::MissingEnvVar("DAIRY_JWT_SECRET".to_owned()));
                }
                None => (SecretString::from(DEV_JWT_SECRET), true),
            };

        let cors_origins = env.get("DAIRY_CORS_ORIGINS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        });
        let rate_limit = env.parse_or("DAIRY_RATE_LIMIT", true)?;
        let log_format = env.parse_or("DAIRY_LOG_FORMAT", LogFormat::Text)?;

        let sentry_dsn = env.get("SENTRY_DSN");
        let sentry_environment = env.get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .get("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            storage,
            host,
            port,
            environment,
            jwt_secret,
            jwt_secret_is_default,
            cors_origins,
            rate_limit,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The signing secret bytes.
    pub(crate) fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a variable, treating empty values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
        })
    }
}

/// Validate length, placeholder patterns and entropy of a signing secret.
fn validate_jwt_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }
    validate_secret_strength(secret, var_name)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
