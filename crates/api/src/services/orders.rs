//! Order service.
//!
//! Orders are validated in a fixed sequence so that clients always see the
//! first structural problem before any per-field detail: items, then address
//! and date presence, then each address field, then the phone, then the date,
//! and finally the per-field checks collected into one `Validation` error.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use dairy_farm_core::catalog::{DEFAULT_PRODUCT_NAME, default_price_per_liter};
use dairy_farm_core::{
    DeliveryAddress, DeliverySlot, LineItem, LineItemError, MAX_SPECIAL_INSTRUCTIONS, NewOrder,
    Order, OrderId, OrderStats, PaymentMethod, UserId, clean_phone,
};

use crate::db::{OrderStore, RepositoryError, UserStore};
use crate::models::{OrderResponse, UserSummary};
use crate::services::FieldErrors;

/// Errors returned by [`OrderService`].
///
/// The `Display` output of the request errors is the message shown to API
/// clients.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order items are required")]
    ItemsRequired,

    #[error("Delivery address and date are required")]
    AddressAndDateRequired,

    #[error("{0} is required in delivery address")]
    MissingAddressField(&'static str),

    #[error("Phone number must be at least 10 digits")]
    PhoneTooShort,

    #[error("Invalid delivery date")]
    InvalidDeliveryDate,

    #[error("Delivery date must be today or a future date")]
    DeliveryDateInPast,

    /// Per-field failures in items, delivery slot, payment method or
    /// instructions.
    #[error("Validation error")]
    Validation(FieldErrors),

    #[error("Order not found")]
    NotFound,

    #[error("Access denied. This order does not belong to you")]
    NotOwner,

    #[error("Order cannot be cancelled. It has already been processed.")]
    NotCancellable,

    /// The token refers to an account that no longer exists.
    #[error("User not found")]
    UserNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Body of `POST /api/orders/create`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub items: Option<Vec<OrderItemRequest>>,
    pub delivery_address: Option<DeliveryAddressRequest>,
    pub delivery_date: Option<String>,
    pub delivery_time: Option<String>,
    pub payment_method: Option<String>,
    pub special_instructions: Option<String>,
}

/// One requested line item. Name and price fall back to the catalog default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItemRequest {
    pub product_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub quantity: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price_per_liter: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub phone: Option<String>,
}

/// Validate a create request against the calendar day `today`.
///
/// # Errors
///
/// Returns the first structural error found, or `OrderError::Validation`
/// with every per-field failure.
pub fn validate_order(
    user_id: UserId,
    req: CreateOrderRequest,
    today: NaiveDate,
) -> Result<NewOrder, OrderError> {
    let items = req
        .items
        .filter(|items| !items.is_empty())
        .ok_or(OrderError::ItemsRequired)?;

    let raw_date = req.delivery_date.filter(|d| !d.trim().is_empty());
    let (Some(address), Some(raw_date)) = (req.delivery_address, raw_date) else {
        return Err(OrderError::AddressAndDateRequired);
    };

    let delivery_address = validate_address(address)?;

    let delivery_date = parse_delivery_date(&raw_date).ok_or(OrderError::InvalidDeliveryDate)?;
    if delivery_date < today {
        return Err(OrderError::DeliveryDateInPast);
    }

    let mut errors = FieldErrors::new();

    let line_items: Vec<LineItem> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| validate_item(i, item, &mut errors))
        .collect();

    let delivery_time = parse_choice(
        &mut errors,
        "deliveryTime",
        "Delivery time",
        req.delivery_time.as_deref(),
        DeliverySlot::ALL,
        DeliverySlot::as_str,
    );
    let payment_method = parse_choice(
        &mut errors,
        "paymentMethod",
        "Payment method",
        req.payment_method.as_deref(),
        PaymentMethod::ALL,
        PaymentMethod::as_str,
    );

    let special_instructions = req
        .special_instructions
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_owned();
    if special_instructions.chars().count() > MAX_SPECIAL_INSTRUCTIONS {
        errors.insert(
            "specialInstructions".to_owned(),
            format!("Special instructions cannot exceed {MAX_SPECIAL_INSTRUCTIONS} characters"),
        );
    }

    if !errors.is_empty() {
        return Err(OrderError::Validation(errors));
    }

    NewOrder::new(
        user_id,
        line_items,
        delivery_address,
        delivery_date,
        delivery_time,
        payment_method,
        special_instructions,
    )
    .map_err(|e| {
        OrderError::Validation(FieldErrors::from([("items".to_owned(), e.to_string())]))
    })
}

fn validate_address(address: DeliveryAddressRequest) -> Result<DeliveryAddress, OrderError> {
    fn required(value: Option<String>, label: &'static str) -> Result<String, OrderError> {
        value
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(OrderError::MissingAddressField(label))
    }

    let street = required(address.street, "Street")?;
    let city = required(address.city, "City")?;
    let state = required(address.state, "State")?;
    let pincode = required(address.pincode, "Pincode")?;
    let phone = required(address.phone, "Phone")?;

    if clean_phone(&phone).chars().count() < 10 {
        return Err(OrderError::PhoneTooShort);
    }

    Ok(DeliveryAddress {
        street,
        city,
        state,
        pincode,
        phone,
    })
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, reduced to its UTC date.
fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn validate_item(index: usize, item: OrderItemRequest, errors: &mut FieldErrors) -> Option<LineItem> {
    let Some(quantity) = item.quantity else {
        errors.insert(
            format!("items[{index}].quantity"),
            "Quantity is required".to_owned(),
        );
        return None;
    };

    let product_name = item
        .product_name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_owned());
    let price_per_liter = item.price_per_liter.unwrap_or_else(default_price_per_liter);

    match LineItem::new(product_name, quantity, price_per_liter) {
        Ok(line) => Some(line),
        Err(e) => {
            let field = match e {
                LineItemError::QuantityTooSmall | LineItemError::TooLarge => "quantity",
                LineItemError::NonPositivePrice => "pricePerLiter",
            };
            errors.insert(format!("items[{index}].{field}"), e.to_string());
            None
        }
    }
}

/// Parse an optional choice, falling back to the type's default when absent.
fn parse_choice<T: Copy + Default + std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    raw: Option<&str>,
    all: &[T],
    as_str: fn(T) -> &'static str,
) -> T {
    let default = T::default();

    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            let allowed: Vec<&str> = all.iter().map(|v| as_str(*v)).collect();
            errors.insert(
                field.to_owned(),
                format!("{label} must be one of: {}", allowed.join(", ")),
            );
            default
        }),
    }
}

/// Order service.
pub struct OrderService<'a> {
    orders: &'a dyn OrderStore,
    users: &'a dyn UserStore,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(orders: &'a dyn OrderStore, users: &'a dyn UserStore) -> Self {
        Self { orders, users }
    }

    /// Place an order for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a validation error (see [`validate_order`]), or
    /// `OrderError::UserNotFound` if the account no longer exists.
    pub async fn create(
        &self,
        user_id: UserId,
        req: CreateOrderRequest,
    ) -> Result<OrderResponse, OrderError> {
        let now = Utc::now();
        let new_order = validate_order(user_id, req, now.date_naive())?;
        let owner = self.owner(user_id).await?;

        let order = new_order.into_order(OrderId::generate(), now);
        self.orders.insert(&order).await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            order_total = %order.order_total,
            items = order.items.len(),
            "Order created"
        );
        Ok(OrderResponse::new(order, owner))
    }

    /// The caller's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::UserNotFound` if the account no longer exists.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderResponse>, OrderError> {
        let owner = self.owner(user_id).await?;
        let orders = self.orders.list_for_user(user_id).await?;

        Ok(orders
            .into_iter()
            .map(|order| OrderResponse::new(order, owner.clone()))
            .collect())
    }

    /// One of the caller's orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown or unparseable ids and
    /// `OrderError::NotOwner` for someone else's order.
    pub async fn get(&self, user_id: UserId, order_id: &str) -> Result<OrderResponse, OrderError> {
        let order = self.owned_order(user_id, order_id).await?;
        let owner = self.owner(user_id).await?;
        Ok(OrderResponse::new(order, owner))
    }

    /// Cancel one of the caller's pending orders.
    ///
    /// # Errors
    ///
    /// Same as [`OrderService::get`], plus `OrderError::NotCancellable` when
    /// the order has moved past `pending`.
    pub async fn cancel(
        &self,
        user_id: UserId,
        order_id: &str,
    ) -> Result<OrderResponse, OrderError> {
        let order = self.owned_order(user_id, order_id).await?;
        if !order.can_cancel() {
            return Err(OrderError::NotCancellable);
        }

        let cancelled = self
            .orders
            .cancel_if_pending(order.id)
            .await?
            .ok_or(OrderError::NotCancellable)?;
        let owner = self.owner(user_id).await?;

        tracing::info!(order_id = %cancelled.id, user_id = %user_id, "Order cancelled");
        Ok(OrderResponse::new(cancelled, owner))
    }

    /// Store-wide counters. Callers must already have checked the admin role.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn stats(&self) -> Result<OrderStats, OrderError> {
        Ok(self.orders.stats().await?)
    }

    async fn owned_order(
        &self,
        user_id: UserId,
        order_id: &str,
    ) -> Result<Order, OrderError> {
        let id: OrderId = order_id.parse().map_err(|_| OrderError::NotFound)?;
        let order = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.is_owned_by(user_id) {
            tracing::warn!(order_id = %id, user_id = %user_id, "Order access denied");
            return Err(OrderError::NotOwner);
        }
        Ok(order)
    }

    async fn owner(&self, user_id: UserId) -> Result<UserSummary, OrderError> {
        self.users
            .get_by_id(user_id)
            .await?
            .map(|user| UserSummary::from(&user))
            .ok_or(OrderError::UserNotFound)
    }
}
