//! Integration tests for the Dairy Farm API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no database needed)
//! cargo test -p dairy-farm-integration-tests
//!
//! # Live-server tests against a running API
//! DAIRY_API_URL=http://localhost:5000 cargo test -p dairy-farm-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api` - Full router over in-memory stores, driven with `oneshot`
//! - `live` - HTTP round trips with `reqwest` (ignored by default)

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use dairy_farm_api::config::AppConfig;
use dairy_farm_api::db::{MemoryOrderStore, MemoryUserStore, UserStore};
use dairy_farm_api::routes;
use dairy_farm_api::state::AppState;
use dairy_farm_core::{Email, UserRole};

/// Password that satisfies every strength rule.
pub const PASSWORD: &str = "Fresh@Milk1";

/// Response status, headers and body. Non-JSON bodies become a JSON string.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// The real router over in-memory stores. Rate limiting is off unless built
/// with [`TestApp::rate_limited`].
pub struct TestApp {
    pub state: AppState,
    pub orders: Arc<MemoryOrderStore>,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Limiters on, as in production. Requests need a client address.
    #[must_use]
    pub fn rate_limited() -> Self {
        Self::build(true)
    }

    fn build(rate_limit: bool) -> Self {
        let config = AppConfig::from_lookup(|key| match key {
            "DAIRY_STORAGE" => Some("memory".to_owned()),
            "DAIRY_RATE_LIMIT" => Some(rate_limit.to_string()),
            _ => None,
        })
        .unwrap();

        let users = Arc::new(MemoryUserStore::new());
        let orders = Arc::new(MemoryOrderStore::new());
        let state = AppState::with_stores(config, users, orders.clone());
        let router = routes::router(state.clone());

        Self {
            state,
            orders,
            router,
        }
    }

    /// Send a prepared request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a JSON request, optionally with a bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: &Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: &Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    /// Register a buyer and return the response.
    pub async fn register(&self, first_name: &str, email: &str) -> TestResponse {
        self.post(
            "/api/auth/register",
            None,
            &json!({
                "firstName": first_name,
                "lastName": "Patel",
                "email": email,
                "phone": "98765 43210",
                "password": PASSWORD,
            }),
        )
        .await
    }

    /// Log in and return the token.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                None,
                &json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["token"].as_str().unwrap().to_owned()
    }

    /// Register a buyer and log in.
    pub async fn buyer(&self, email: &str) -> String {
        let response = self.register("Asha", email).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        self.login(email).await
    }

    /// Register, promote to admin, then log in so the token carries the role.
    pub async fn admin(&self, email: &str) -> String {
        let response = self.register("Meera", email).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        self.state
            .users()
            .set_role(&Email::parse(email).unwrap(), UserRole::Admin)
            .await
            .unwrap();
        self.login(email).await
    }
}

/// A valid order body for delivery on `date` (`YYYY-MM-DD`).
#[must_use]
pub fn order_body(date: &str) -> Value {
    json!({
        "items": [{ "productName": "Fresh Organic Whole Milk", "quantity": 2, "pricePerLiter": 70 }],
        "deliveryAddress": {
            "street": "12 Dairy Lane",
            "city": "Anand",
            "state": "Gujarat",
            "pincode": "388001",
            "phone": "98765 43210"
        },
        "deliveryDate": date,
        "deliveryTime": "morning",
        "paymentMethod": "cod"
    })
}

/// Tomorrow's UTC date as `YYYY-MM-DD`.
#[must_use]
pub fn tomorrow() -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

/// Yesterday's UTC date as `YYYY-MM-DD`.
#[must_use]
pub fn yesterday() -> String {
    (chrono::Utc::now().date_naive() - chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}
