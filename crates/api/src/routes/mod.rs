//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Banner
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (store ping)
//!
//! # Products
//! GET  /api/products                  - Product catalog
//!
//! # Auth (register/login are rate limited)
//! POST /api/auth/register             - Create a buyer account
//! POST /api/auth/login                - Exchange credentials for a token
//! POST /api/auth/logout               - Revoke the presented token (auth)
//! GET  /api/auth/profile              - Own profile (auth)
//! PUT  /api/auth/profile              - Update own profile (auth)
//! PUT  /api/auth/change-password      - Change own password (auth)
//!
//! # Orders (all require auth)
//! POST /api/orders/create             - Place an order
//! GET  /api/orders/my-orders          - Own orders, newest first
//! GET  /api/orders/stats/overview     - Store-wide statistics (admin)
//! GET  /api/orders/{orderId}          - One own order
//! PUT  /api/orders/{orderId}/cancel   - Cancel a pending own order
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id::REQUEST_ID_HEADER;
use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, request_id_middleware, require_bearer,
};
use crate::state::AppState;

/// Body for responses that carry only a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Public auth routes.
fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
}

/// Auth routes that require a bearer token.
fn protected_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/change-password", put(auth::change_password))
}

/// Order routes. All require a bearer token.
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(orders::create))
        .route("/my-orders", get(orders::my_orders))
        .route("/stats/overview", get(orders::stats))
        .route("/{order_id}", get(orders::show))
        .route("/{order_id}/cancel", put(orders::cancel))
}

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    let config = state.config();

    let mut public_auth = public_auth_routes();
    if config.rate_limit {
        public_auth = public_auth.layer(auth_rate_limiter());
    }

    let protected = Router::new()
        .nest("/api/auth", protected_auth_routes())
        .nest("/api/orders", order_routes())
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    let mut app = Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/products", get(products::list))
        .merge(public_auth)
        .merge(protected)
        .fallback(not_found);

    if config.rate_limit {
        app = app.layer(api_rate_limiter());
    }

    app.layer(cors_layer(config.cors_origins.as_deref()))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS for the configured origins, or any origin when none are configured.
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

async fn banner() -> &'static str {
    "Dairy Farm API is running..."
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the user store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.users().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse {
            message: "Route not found",
        }),
    )
}
