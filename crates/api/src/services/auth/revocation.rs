//! Denylist of revoked token ids.
//!
//! An entry lives until the revoked token would have expired on its own, so
//! the cache never grows past the set of tokens that could still verify.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;

use super::token::{Claims, TokenIssuer};

const MAX_REVOKED_TOKENS: u64 = 100_000;

struct UntilTokenExpiry;

impl Expiry<String, DateTime<Utc>> for UntilTokenExpiry {
    fn expire_after_create(
        &self,
        _jti: &String,
        expires_at: &DateTime<Utc>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(
            (*expires_at - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }
}

/// Revoked token ids, keyed by `jti`.
#[derive(Clone)]
pub struct RevocationList {
    revoked: Cache<String, DateTime<Utc>>,
}

impl Default for RevocationList {
    fn default() -> Self {
        Self::new()
    }
}

impl RevocationList {
    #[must_use]
    pub fn new() -> Self {
        let ttl = TokenIssuer::ttl().to_std().unwrap_or(Duration::from_secs(86_400));
        Self {
            revoked: Cache::builder()
                .max_capacity(MAX_REVOKED_TOKENS)
                .time_to_live(ttl)
                .expire_after(UntilTokenExpiry)
                .build(),
        }
    }

    /// Reject this token from now until it expires.
    pub async fn revoke(&self, claims: &Claims) {
        self.revoked
            .insert(claims.jti.clone(), claims.expires_at())
            .await;
    }

    #[must_use]
    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains_key(jti)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dairy_farm_core::{UserId, UserRole};

    use super::*;

    #[tokio::test]
    async fn test_revoke_marks_jti() {
        let issuer = TokenIssuer::new(b"revocation-test-signing-key-000000");
        let list = RevocationList::new();
        let issued = issuer.issue(UserId::generate(), UserRole::Buyer).unwrap();
        let other = issuer.issue(UserId::generate(), UserRole::Buyer).unwrap();

        assert!(!list.is_revoked(&issued.claims.jti));
        list.revoke(&issued.claims).await;
        assert!(list.is_revoked(&issued.claims.jti));
        assert!(!list.is_revoked(&other.claims.jti));
    }
}
