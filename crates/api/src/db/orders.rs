//! `PostgreSQL` order store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use dairy_farm_core::{
    DeliveryAddress, DeliverySlot, LineItem, Order, OrderId, OrderStats, OrderStatus,
    PaymentMethod, PaymentStatus, UserId,
};

use super::{OrderStore, RepositoryError};

const ORDER_COLUMNS: &str = "id, user_id, items, order_total, \
    delivery_street, delivery_city, delivery_state, delivery_pincode, delivery_phone, \
    order_status, payment_status, payment_method, delivery_date, delivery_time, \
    special_instructions, order_date, updated_at";

/// JSONB shape of a line item. Amounts are decimal strings so they read
/// back exactly.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLineItem {
    product_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    price_per_liter: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    total_price: Decimal,
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price_per_liter: item.price_per_liter,
            total_price: item.total_price,
        }
    }
}

impl From<StoredLineItem> for LineItem {
    fn from(item: StoredLineItem) -> Self {
        Self {
            product_name: item.product_name,
            quantity: item.quantity,
            price_per_liter: item.price_per_liter,
            total_price: item.total_price,
        }
    }
}

fn stored_items(items: &[LineItem]) -> Vec<StoredLineItem> {
    items.iter().map(StoredLineItem::from).collect()
}

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    items: Json<Vec<StoredLineItem>>,
    order_total: Decimal,
    delivery_street: String,
    delivery_city: String,
    delivery_state: String,
    delivery_pincode: String,
    delivery_phone: String,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: PaymentMethod,
    delivery_date: NaiveDate,
    delivery_time: DeliverySlot,
    special_instructions: String,
    order_date: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0.into_iter().map(LineItem::from).collect(),
            order_total: row.order_total,
            delivery_address: DeliveryAddress {
                street: row.delivery_street,
                city: row.delivery_city,
                state: row.delivery_state,
                pincode: row.delivery_pincode,
                phone: row.delivery_phone,
            },
            order_status: row.order_status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            delivery_date: row.delivery_date,
            delivery_time: row.delivery_time,
            special_instructions: row.special_instructions,
            order_date: row.order_date,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct StatsRow {
    total_orders: i64,
    pending_orders: i64,
    delivered_orders: i64,
    total_revenue: Decimal,
}

/// Order store backed by `dairy.order`.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO dairy."order" ({ORDER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(stored_items(&order.items)))
        .bind(order.order_total)
        .bind(&order.delivery_address.street)
        .bind(&order.delivery_address.city)
        .bind(&order.delivery_address.state)
        .bind(&order.delivery_address.pincode)
        .bind(&order.delivery_address.phone)
        .bind(order.order_status)
        .bind(order.payment_status)
        .bind(order.payment_method)
        .bind(order.delivery_date)
        .bind(order.delivery_time)
        .bind(&order.special_instructions)
        .bind(order.order_date)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "order"))?;

        Ok(())
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM dairy."order" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM dairy."order"
            WHERE user_id = $1
            ORDER BY order_date DESC, id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn cancel_if_pending(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE dairy."order"
            SET order_status = $2, updated_at = now()
            WHERE id = $1 AND order_status = $3
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(OrderStatus::Cancelled)
        .bind(OrderStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE order_status = 'pending') AS pending_orders,
                COUNT(*) FILTER (WHERE order_status = 'delivered') AS delivered_orders,
                COALESCE(SUM(order_total) FILTER (WHERE order_status = 'delivered'), 0)
                    AS total_revenue
            FROM dairy."order"
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderStats {
            total_orders: row.total_orders,
            pending_orders: row.pending_orders,
            delivered_orders: row.delivered_orders,
            total_revenue: row.total_revenue.normalize(),
        })
    }
}
