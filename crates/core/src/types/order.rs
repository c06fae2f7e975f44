//! Order domain types.
//!
//! The order total is derived here and nowhere else: [`NewOrder::new`] sums
//! the line totals produced by [`LineItem::new`], and stores persist the
//! resulting value as-is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, UserId};
use super::status::{DeliverySlot, OrderStatus, PaymentMethod, PaymentStatus};

/// Maximum length of `specialInstructions`, in characters.
pub const MAX_SPECIAL_INSTRUCTIONS: usize = 200;

/// Smallest orderable quantity, in litres.
#[must_use]
pub fn min_quantity() -> Decimal {
    Decimal::new(5, 1)
}

/// Errors produced when building a [`LineItem`].
///
/// The `Display` output is the message shown to API clients.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemError {
    #[error("Quantity must be at least 0.5 litres")]
    QuantityTooSmall,
    #[error("Price per liter must be greater than 0")]
    NonPositivePrice,
    #[error("Quantity is too large")]
    TooLarge,
}

/// The line totals of an order add up to more than a [`Decimal`] can hold.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Order total is too large")]
pub struct OrderTotalTooLarge;

/// One product/quantity/price entry within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_liter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl LineItem {
    /// Build a line item, computing its total as `quantity * price_per_liter`.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::QuantityTooSmall`] when `quantity < 0.5`,
    /// [`LineItemError::NonPositivePrice`] when `price_per_liter <= 0` and
    /// [`LineItemError::TooLarge`] when the product overflows.
    pub fn new(
        product_name: impl Into<String>,
        quantity: Decimal,
        price_per_liter: Decimal,
    ) -> Result<Self, LineItemError> {
        if quantity < min_quantity() {
            return Err(LineItemError::QuantityTooSmall);
        }
        if price_per_liter <= Decimal::ZERO {
            return Err(LineItemError::NonPositivePrice);
        }

        let total_price = quantity
            .checked_mul(price_per_liter)
            .ok_or(LineItemError::TooLarge)?;

        Ok(Self {
            product_name: product_name.into(),
            quantity,
            price_per_liter,
            total_price: total_price.normalize(),
        })
    }
}

/// Sum of the line totals, or `None` if it overflows.
#[must_use]
pub fn order_total(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total_price))
        .map(|total| total.normalize())
}

/// Where an order is delivered. Every field is required and stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

/// A validated order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    items: Vec<LineItem>,
    order_total: Decimal,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_time: DeliverySlot,
    pub special_instructions: String,
}

impl NewOrder {
    /// Assemble an order for `user_id`. The total is derived from `items`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderTotalTooLarge`] when the line totals overflow.
    pub fn new(
        user_id: UserId,
        items: Vec<LineItem>,
        delivery_address: DeliveryAddress,
        delivery_date: NaiveDate,
        delivery_time: DeliverySlot,
        payment_method: PaymentMethod,
        special_instructions: String,
    ) -> Result<Self, OrderTotalTooLarge> {
        let order_total = order_total(&items).ok_or(OrderTotalTooLarge)?;
        Ok(Self {
            user_id,
            items,
            order_total,
            delivery_address,
            payment_method,
            delivery_date,
            delivery_time,
            special_instructions,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub const fn order_total(&self) -> Decimal {
        self.order_total
    }

    /// Materialize the persisted form with fresh id and timestamps.
    ///
    /// New orders always start `pending` for both order and payment status.
    #[must_use]
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            order_total: self.order_total,
            delivery_address: self.delivery_address,
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: self.payment_method,
            delivery_date: self.delivery_date,
            delivery_time: self.delivery_time,
            special_instructions: self.special_instructions,
            order_date: now,
            updated_at: now,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
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

impl Order {
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        self.order_status.is_cancellable()
    }
}

/// Aggregate counters over all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub delivered_orders: i64,
    /// Sum of `order_total` over delivered orders only.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "12 Meadow Lane".to_owned(),
            city: "Anand".to_owned(),
            state: "Gujarat".to_owned(),
            pincode: "388001".to_owned(),
            phone: "9876543210".to_owned(),
        }
    }

    #[test]
    fn test_line_total() {
        let item = LineItem::new("Milk", dec("2"), dec("70")).unwrap();
        assert_eq!(item.total_price, dec("140"));

        let half = LineItem::new("Milk", dec("0.5"), dec("70")).unwrap();
        assert_eq!(half.total_price, dec("35"));
    }

    #[test]
    fn test_line_item_rules() {
        assert_eq!(
            LineItem::new("Milk", dec("0.4"), dec("70")),
            Err(LineItemError::QuantityTooSmall)
        );
        assert_eq!(
            LineItem::new("Milk", dec("0"), dec("70")),
            Err(LineItemError::QuantityTooSmall)
        );
        assert_eq!(
            LineItem::new("Milk", dec("1"), dec("0")),
            Err(LineItemError::NonPositivePrice)
        );
        assert_eq!(
            LineItem::new("Milk", dec("1"), dec("-70")),
            Err(LineItemError::NonPositivePrice)
        );
    }

    #[test]
    fn test_line_total_overflow() {
        assert_eq!(
            LineItem::new("Milk", dec("1000000000000000"), dec("1000000000000000")),
            Err(LineItemError::TooLarge)
        );
        assert_eq!(
            LineItem::new("Milk", Decimal::MAX, dec("2")),
            Err(LineItemError::TooLarge)
        );
    }

    #[test]
    fn test_order_total_overflow() {
        let big = LineItem::new("Milk", dec("5000000000000000000000000000"), dec("10")).unwrap();
        let items = vec![big.clone(), big];
        assert_eq!(order_total(&items), None);

        let result = NewOrder::new(
            UserId::generate(),
            items,
            address(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            DeliverySlot::Morning,
            PaymentMethod::Cod,
            String::new(),
        );
        assert_eq!(result, Err(OrderTotalTooLarge));
    }

    #[test]
    fn test_order_total_is_sum_of_lines() {
        let items = vec![
            LineItem::new("Milk", dec("2"), dec("70")).unwrap(),
            LineItem::new("Milk", dec("1.5"), dec("70")).unwrap(),
            LineItem::new("Ghee", dec("0.5"), dec("640")).unwrap(),
        ];
        assert_eq!(order_total(&items), Some(dec("565")));

        let order = NewOrder::new(
            UserId::generate(),
            items,
            address(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            DeliverySlot::Morning,
            PaymentMethod::Cod,
            String::new(),
        )
        .unwrap();
        assert_eq!(order.order_total(), dec("565"));
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(order_total(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_into_order_starts_pending() {
        let user_id = UserId::generate();
        let now = Utc::now();
        let order = NewOrder::new(
            user_id,
            vec![LineItem::new("Milk", dec("1"), dec("70")).unwrap()],
            address(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            DeliverySlot::Evening,
            PaymentMethod::Online,
            "Ring twice".to_owned(),
        )
        .unwrap()
        .into_order(OrderId::generate(), now);

        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.order_date, now);
        assert_eq!(order.updated_at, now);
        assert!(order.is_owned_by(user_id));
        assert!(!order.is_owned_by(UserId::generate()));
        assert!(order.can_cancel());
    }

    #[test]
    fn test_line_item_json_uses_numbers() {
        let item = LineItem::new("Fresh Organic Whole Milk", dec("1.5"), dec("70")).unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productName"], "Fresh Organic Whole Milk");
        assert_eq!(json["quantity"].as_f64(), Some(1.5));
        assert_eq!(json["pricePerLiter"].as_f64(), Some(70.0));
        assert_eq!(json["totalPrice"].as_f64(), Some(105.0));

        let back: LineItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
