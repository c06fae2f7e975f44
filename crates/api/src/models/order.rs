//! Order response types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use dairy_farm_core::{
    DeliveryAddress, DeliverySlot, LineItem, Order, OrderId, OrderStatus, PaymentMethod,
    PaymentStatus,
};

use super::user::UserSummary;

/// An order joined with its owner's public summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub user: UserSummary,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_total: Decimal,
    pub delivery_address: DeliveryAddress,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_time: DeliverySlot,
    pub special_instructions: String,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    #[must_use]
    pub fn new(order: Order, user: UserSummary) -> Self {
        Self {
            id: order.id,
            user,
            items: order.items,
            order_total: order.order_total,
            delivery_address: order.delivery_address,
            order_status: order.order_status,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            delivery_date: order.delivery_date,
            delivery_time: order.delivery_time,
            special_instructions: order.special_instructions,
            order_date: order.order_date,
            updated_at: order.updated_at,
        }
    }
}
