//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use dairy_farm_core::OrderStats;

use crate::error::{ApiJson, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::OrderResponse;
use crate::services::orders::CreateOrderRequest;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub message: &'static str,
    pub order: OrderResponse,
}

#[derive(Debug, Serialize)]
pub struct OrdersEnvelope {
    pub message: &'static str,
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Serialize)]
pub struct StatsEnvelope {
    pub message: &'static str,
    pub stats: OrderStats,
}

/// `POST /api/orders/create`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderEnvelope>)> {
    let order = state.orders().create(claims.id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderEnvelope {
            message: "Order created successfully",
            order,
        }),
    ))
}

/// `GET /api/orders/my-orders`
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<OrdersEnvelope>> {
    let orders = state.orders().list_for_user(claims.id).await?;

    Ok(Json(OrdersEnvelope {
        message: "Orders retrieved successfully",
        orders,
    }))
}

/// `GET /api/orders/{order_id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(order_id): Path<String>,
) -> Result<Json<OrderEnvelope>> {
    let order = state.orders().get(claims.id, &order_id).await?;

    Ok(Json(OrderEnvelope {
        message: "Order retrieved successfully",
        order,
    }))
}

/// `PUT /api/orders/{order_id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(order_id): Path<String>,
) -> Result<Json<OrderEnvelope>> {
    let order = state.orders().cancel(claims.id, &order_id).await?;

    Ok(Json(OrderEnvelope {
        message: "Order cancelled successfully",
        order,
    }))
}

/// `GET /api/orders/stats/overview` (admin only)
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<StatsEnvelope>> {
    let stats = state.orders().stats().await?;

    Ok(Json(StatsEnvelope {
        message: "Order statistics retrieved successfully",
        stats,
    }))
}
