//! Bearer token issuing and verification (HS256 JWT).

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dairy_farm_core::{UserId, UserRole};

/// How long an issued token stays valid.
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Token failures, in the order the middleware reports them.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no bearer token")]
    Missing,
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token revoked")]
    Revoked,
    /// Signing failed or the key could not be used.
    #[error("token processing failed: {0}")]
    Internal(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidKeyFormat => Self::Internal(err),
            _ => Self::Invalid,
        }
    }
}

/// JWT claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub id: UserId,
    pub role: UserRole,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds), always `iat + 86400`.
    pub exp: i64,
    /// Unique token id, used for revocation.
    pub jti: String,
}

impl Claims {
    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a 24-hour token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Internal` if signing fails.
    pub fn issue(&self, user_id: UserId, role: UserRole) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Internal` if signing fails.
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            id: user_id,
            role,
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Internal)?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything malformed or wrongly signed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Token lifetime.
    #[must_use]
    pub fn ttl() -> Duration {
        Duration::seconds(TOKEN_TTL_SECONDS)
    }
}
