//! Bearer token authentication middleware and extractors.
//!
//! [`require_bearer`] guards the protected routes: it verifies the token,
//! consults the revocation list and stores the decoded [`Claims`] in the
//! request extensions. Handlers then pull the identity out with
//! [`RequireAuth`] or [`RequireAdmin`]. No store lookups happen here.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{Claims, TokenError};
use crate::state::AppState;

/// Middleware that rejects requests without a valid, unrevoked bearer token.
///
/// # Errors
///
/// Returns `401` for missing, expired, malformed or revoked tokens.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(TokenError::Missing)?;
    let claims = state.tokens().verify(token)?;

    if state.revoked().is_revoked(&claims.jti) {
        return Err(TokenError::Revoked.into());
    }

    Span::current().record("user_id", tracing::field::display(claims.id));
    set_sentry_user(&claims.id);

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// The token from `Authorization: Bearer <token>`, if present and non-empty.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for the authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(claims): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", claims.id)
/// }
/// ```
pub struct RequireAuth(pub Claims);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Self)
            .ok_or_else(|| TokenError::Missing.into())
    }
}

/// Extractor for an authenticated caller with the `admin` role.
pub struct RequireAdmin(pub Claims);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;

        if !claims.role.is_admin() {
            tracing::warn!(user_id = %claims.id, "Admin route denied");
            return Err(AppError::Forbidden("Admin access required"));
        }
        Ok(Self(claims))
    }
}
