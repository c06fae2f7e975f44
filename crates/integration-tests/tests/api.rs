//! In-process tests of the full router over in-memory stores.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use dairy_farm_core::{OrderId, OrderStatus, UserId, UserRole};
use dairy_farm_integration_tests::{PASSWORD, TestApp, order_body, tomorrow, yesterday};

// ============================================================================
// Service Endpoints
// ============================================================================

#[tokio::test]
async fn test_banner_and_health() {
    let app = TestApp::new();

    let banner = app.get("/", None).await;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.body, "Dairy Farm API is running...");

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "edge-1234")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers["x-request-id"], "edge-1234");

    let response = app.get("/health", None).await;
    let generated = response.headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let response = app.get("/api/nothing-here", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Route not found");
}

#[tokio::test]
async fn test_products() {
    let app = TestApp::new();
    let response = app.get("/api/products", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Products retrieved successfully");

    let product = &response.body["products"][0];
    assert_eq!(product["name"], "Fresh Organic Whole Milk");
    assert_eq!(product["pricePerLiter"].as_f64(), Some(70.0));
    assert_eq!(product["quantityOptions"].as_array().unwrap().len(), 7);
}

// ============================================================================
// Rate Limiting
// ============================================================================

fn register_from(peer: [u8; 4]) -> Request<Body> {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 51000))));
    request
}

#[tokio::test]
async fn test_register_is_rate_limited_per_client() {
    let app = TestApp::rate_limited();

    for _ in 0..5 {
        let response = app.send(register_from([198, 51, 100, 7])).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = app.send(register_from([198, 51, 100, 7])).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    let response = app.send(register_from([198, 51, 100, 8])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    health
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 7], 51000))));
    assert_eq!(app.send(health).await.status, StatusCode::OK);
}

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
async fn test_register_returns_public_user() {
    let app = TestApp::new();
    let response = app.register(" Asha ", " asha@example.com ").await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "User registered successfully");

    let user = &response.body["user"];
    assert_eq!(user["firstName"], "Asha");
    assert_eq!(user["email"], "asha@example.com");
    assert_eq!(user["role"], "buyer");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new();
    let response = app
        .post(
            "/api/auth/register",
            None,
            &json!({
                "firstName": "A",
                "email": "not-an-email",
                "phone": "12345",
                "password": "password1"
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Validation failed");

    let errors = &response.body["errors"];
    assert_eq!(errors["firstName"], "First name must be at least 2 characters");
    assert_eq!(errors["lastName"], "Last name is required");
    assert_eq!(errors["email"], "Please enter a valid email address");
    assert_eq!(errors["phone"], "Phone number must be at least 10 digits");
    assert_eq!(
        errors["password"],
        "Password must contain at least one uppercase letter"
    );
}

#[tokio::test]
async fn test_register_duplicate_email_case_insensitive() {
    let app = TestApp::new();
    assert_eq!(
        app.register("Asha", "asha@example.com").await.status,
        StatusCode::CREATED
    );

    let response = app.register("Asha", "ASHA@Example.com").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "User already exists");
    assert_eq!(
        response.body["errors"]["email"],
        "Email already exists. Please use a different email."
    );
}

#[tokio::test]
async fn test_malformed_body() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid request body");
}

#[tokio::test]
async fn test_login_token_lasts_one_day() {
    let app = TestApp::new();
    app.register("Asha", "asha@example.com").await;

    let response = app
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "asha@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Login successful");
    assert!(response.body["user"].get("passwordHash").is_none());

    let token = response.body["token"].as_str().unwrap();
    let claims = app.state.tokens().verify(token).unwrap();
    assert_eq!(claims.exp - claims.iat, 86_400);
    assert_eq!(claims.role, UserRole::Buyer);
    assert_eq!(
        claims.id.to_string(),
        response.body["user"]["id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn test_login_failures_have_identical_bodies() {
    let app = TestApp::new();
    app.register("Asha", "asha@example.com").await;

    let wrong_password = app
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "asha@example.com", "password": "Wrong@Milk1" }),
        )
        .await;
    let unknown_email = app
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "nobody@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body, json!({ "message": "Invalid credentials" }));
}

// ============================================================================
// Bearer Tokens
// ============================================================================

#[tokio::test]
async fn test_missing_and_invalid_tokens() {
    let app = TestApp::new();

    let response = app.get("/api/auth/profile", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "No token, authorization denied");

    let response = app.get("/api/auth/profile", Some("not.a.token")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["message"],
        "Invalid token, authorization denied"
    );
}

#[tokio::test]
async fn test_expired_token() {
    let app = TestApp::new();
    let issued = app
        .state
        .tokens()
        .issue_at(
            UserId::generate(),
            UserRole::Buyer,
            Utc::now() - Duration::hours(25),
        )
        .unwrap();

    let response = app.get("/api/auth/profile", Some(&issued.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Token expired, please login again");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app.post("/api/auth/logout", Some(&token), &json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged out successfully");

    let response = app.get("/api/auth/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["message"],
        "Token has been revoked, please login again"
    );

    let fresh = app.login("asha@example.com").await;
    assert_eq!(
        app.get("/api/auth/profile", Some(&fresh)).await.status,
        StatusCode::OK
    );
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_get_profile() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app.get("/api/auth/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Profile retrieved successfully");
    assert_eq!(response.body["user"]["email"], "asha@example.com");
}

#[tokio::test]
async fn test_profile_of_missing_user() {
    let app = TestApp::new();
    let issued = app
        .state
        .tokens()
        .issue(UserId::generate(), UserRole::Buyer)
        .unwrap();

    let response = app.get("/api/auth/profile", Some(&issued.token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "User not found");
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app
        .put(
            "/api/auth/profile",
            Some(&token),
            &json!({ "lastName": "Shah", "phone": "+91 98765 00000" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Profile updated successfully");
    assert_eq!(response.body["user"]["firstName"], "Asha");
    assert_eq!(response.body["user"]["lastName"], "Shah");
    assert_eq!(response.body["user"]["phone"], "+91 98765 00000");
}

#[tokio::test]
async fn test_update_profile_rejects_taken_email() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;
    app.register("Ravi", "ravi@example.com").await;

    let response = app
        .put(
            "/api/auth/profile",
            Some(&token),
            &json!({ "email": "Ravi@Example.com" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["errors"]["email"],
        "Email already exists. Please use a different email."
    );
}

#[tokio::test]
async fn test_update_profile_password_pair() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app
        .put(
            "/api/auth/profile",
            Some(&token),
            &json!({ "currentPassword": PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Current password and new password are both required"
    );
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app
        .put(
            "/api/auth/change-password",
            Some(&token),
            &json!({ "currentPassword": "Wrong@Milk1", "newPassword": "Better@Milk2" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid current password");

    let response = app
        .put(
            "/api/auth/change-password",
            Some(&token),
            &json!({ "currentPassword": PASSWORD, "newPassword": "weak" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Validation failed");
    assert!(response.body["errors"]["newPassword"].is_string());

    let response = app
        .put(
            "/api/auth/change-password",
            Some(&token),
            &json!({ "currentPassword": PASSWORD, "newPassword": "Better@Milk2" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Password changed successfully");

    let response = app
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "asha@example.com", "password": "Better@Milk2" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_create_order() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app
        .post("/api/orders/create", Some(&token), &order_body(&tomorrow()))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    assert_eq!(response.body["message"], "Order created successfully");

    let order = &response.body["order"];
    assert_eq!(order["items"][0]["totalPrice"].as_f64(), Some(140.0));
    assert_eq!(order["orderTotal"].as_f64(), Some(140.0));
    assert_eq!(order["orderStatus"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["deliveryDate"], tomorrow());
    assert_eq!(order["user"]["email"], "asha@example.com");
    assert_eq!(order["user"]["firstName"], "Asha");
}

#[tokio::test]
async fn test_create_order_applies_defaults() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let mut body = order_body(&tomorrow());
    body["items"] = json!([{ "quantity": 1.5 }]);
    body.as_object_mut().unwrap().remove("deliveryTime");
    body.as_object_mut().unwrap().remove("paymentMethod");

    let response = app.post("/api/orders/create", Some(&token), &body).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

    let order = &response.body["order"];
    assert_eq!(order["items"][0]["productName"], "Fresh Organic Whole Milk");
    assert_eq!(order["items"][0]["pricePerLiter"].as_f64(), Some(70.0));
    assert_eq!(order["orderTotal"].as_f64(), Some(105.0));
    assert_eq!(order["deliveryTime"], "morning");
    assert_eq!(order["paymentMethod"], "cod");
    assert_eq!(order["specialInstructions"], "");
}

#[tokio::test]
async fn test_create_order_rejections() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let response = app
        .post("/api/orders/create", Some(&token), &order_body(&yesterday()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Delivery date must be today or a future date"
    );

    let mut body = order_body(&tomorrow());
    body["items"] = json!([]);
    let response = app.post("/api/orders/create", Some(&token), &body).await;
    assert_eq!(response.body["message"], "Order items are required");

    let mut body = order_body(&tomorrow());
    body["deliveryAddress"]["city"] = json!("  ");
    let response = app.post("/api/orders/create", Some(&token), &body).await;
    assert_eq!(
        response.body["message"],
        "City is required in delivery address"
    );

    let mut body = order_body(&tomorrow());
    body["items"] = json!([{ "quantity": 2 }, { "quantity": 0.25 }]);
    let response = app.post("/api/orders/create", Some(&token), &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Validation error");
    assert_eq!(
        response.body["errors"]["items[1].quantity"],
        "Quantity must be at least 0.5 litres"
    );
}

#[tokio::test]
async fn test_create_order_with_huge_amounts_is_rejected() {
    let app = TestApp::new();
    let token = app.buyer("asha@example.com").await;

    let mut body = order_body(&tomorrow());
    body["items"] = json!([{ "quantity": 1e15, "pricePerLiter": 1e15 }]);
    let response = app.post("/api/orders/create", Some(&token), &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Validation error");
    assert_eq!(response.body["errors"]["items[0].quantity"], "Quantity is too large");

    body["items"] = json!([
        { "quantity": 5e27, "pricePerLiter": 10 },
        { "quantity": 5e27, "pricePerLiter": 10 }
    ]);
    let response = app.post("/api/orders/create", Some(&token), &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"]["items"], "Order total is too large");

    let response = app.get("/api/orders/my-orders", Some(&token)).await;
    assert_eq!(response.body["orders"], json!([]));
}

#[tokio::test]
async fn test_orders_require_token() {
    let app = TestApp::new();
    let response = app
        .post("/api/orders/create", None, &order_body(&tomorrow()))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

async fn place_order(app: &TestApp, token: &str) -> Value {
    let response = app
        .post("/api/orders/create", Some(token), &order_body(&tomorrow()))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["order"].clone()
}

#[tokio::test]
async fn test_my_orders_only_own_newest_first() {
    let app = TestApp::new();
    let asha = app.buyer("asha@example.com").await;
    let ravi = app.buyer("ravi@example.com").await;

    let first = place_order(&app, &asha).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = place_order(&app, &asha).await;
    place_order(&app, &ravi).await;

    let response = app.get("/api/orders/my-orders", Some(&asha)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Orders retrieved successfully");

    let ids: Vec<&Value> = response.body["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| &o["id"])
        .collect();
    assert_eq!(ids, vec![&second["id"], &first["id"]]);
}

#[tokio::test]
async fn test_get_order_ownership() {
    let app = TestApp::new();
    let asha = app.buyer("asha@example.com").await;
    let ravi = app.buyer("ravi@example.com").await;
    let order = place_order(&app, &asha).await;
    let uri = format!("/api/orders/{}", order["id"].as_str().unwrap());

    let response = app.get(&uri, Some(&asha)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Order retrieved successfully");
    assert_eq!(response.body["order"]["items"], order["items"]);
    assert_eq!(response.body["order"]["orderTotal"], order["orderTotal"]);

    let response = app.get(&uri, Some(&ravi)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["message"],
        "Access denied. This order does not belong to you"
    );

    let missing_uris = [
        "/api/orders/not-a-uuid".to_owned(),
        format!("/api/orders/{}", OrderId::generate()),
    ];
    for missing in missing_uris {
        let response = app.get(&missing, Some(&asha)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["message"], "Order not found");
    }
}

#[tokio::test]
async fn test_cancel_order() {
    let app = TestApp::new();
    let asha = app.buyer("asha@example.com").await;
    let ravi = app.buyer("ravi@example.com").await;
    let order = place_order(&app, &asha).await;
    let uri = format!("/api/orders/{}/cancel", order["id"].as_str().unwrap());

    let response = app.put(&uri, Some(&ravi), &json!({})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.put(&uri, Some(&asha), &json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Order cancelled successfully");
    assert_eq!(response.body["order"]["orderStatus"], "cancelled");

    let response = app.put(&uri, Some(&asha), &json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_processed_order_keeps_status() {
    let app = TestApp::new();
    let asha = app.buyer("asha@example.com").await;
    let order = place_order(&app, &asha).await;
    let id: OrderId = order["id"].as_str().unwrap().parse().unwrap();

    app.orders.set_status(id, OrderStatus::Confirmed).await.unwrap();

    let response = app
        .put(&format!("/api/orders/{id}/cancel"), Some(&asha), &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Order cannot be cancelled. It has already been processed."
    );

    let response = app.get(&format!("/api/orders/{id}"), Some(&asha)).await;
    assert_eq!(response.body["order"]["orderStatus"], "confirmed");
}

#[tokio::test]
async fn test_stats_require_admin() {
    let app = TestApp::new();
    let buyer = app.buyer("asha@example.com").await;
    let admin = app.admin("owner@example.com").await;

    let response = app.get("/api/orders/stats/overview", Some(&buyer)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Admin access required");

    let delivered = place_order(&app, &buyer).await;
    place_order(&app, &buyer).await;
    let id: OrderId = delivered["id"].as_str().unwrap().parse().unwrap();
    app.orders.set_status(id, OrderStatus::Delivered).await.unwrap();

    let response = app.get("/api/orders/stats/overview", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "Order statistics retrieved successfully"
    );

    let stats = &response.body["stats"];
    assert_eq!(stats["totalOrders"], 2);
    assert_eq!(stats["pendingOrders"], 1);
    assert_eq!(stats["deliveredOrders"], 1);
    assert_eq!(stats["totalRevenue"].as_f64(), Some(140.0));
}
