//! Status and choice enums for users and orders.
//!
//! Every enum serializes as `snake_case` on the wire and maps to a Postgres
//! enum in the `dairy` schema when the `postgres` feature is enabled.

use serde::{Deserialize, Serialize};

/// Error returned when parsing one of the enums in this module from a string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Implements `as_str`, `Display` and `FromStr` from a single variant table.
macro_rules! string_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// Every value, in lifecycle order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire and database representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError::new($kind, s)),
                }
            }
        }
    };
}

/// Role of an account.
///
/// Self-registration always yields [`UserRole::Buyer`]; admins are promoted
/// out of band with the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "dairy.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Buyer,
    Admin,
}

string_enum!(UserRole, "user role", {
    Buyer => "buyer",
    Admin => "admin",
});

impl UserRole {
    /// Returns true for administrators.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Fulfillment state of an order.
///
/// Orders start as [`OrderStatus::Pending`]. Buyers can only move an order
/// from `Pending` to `Cancelled`; every other transition belongs to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "dairy.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Preparing => "preparing",
    OutForDelivery => "out_for_delivery",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Whether the buyer may still cancel.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "dairy.payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
    Refunded => "refunded",
});

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "dairy.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Online,
}

string_enum!(PaymentMethod, "payment method", {
    Cod => "cod",
    Online => "online",
});

/// Delivery time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "dairy.delivery_slot", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySlot {
    #[default]
    Morning,
    Afternoon,
    Evening,
}

string_enum!(DeliverySlot, "delivery time", {
    Morning => "morning",
    Afternoon => "afternoon",
    Evening => "evening",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        for status in PaymentStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_from_str_roundtrip() {
        for slot in DeliverySlot::ALL {
            assert_eq!(slot.as_str().parse::<DeliverySlot>().unwrap(), *slot);
        }
        assert_eq!(
            "out_for_delivery".parse::<OrderStatus>().unwrap(),
            OrderStatus::OutForDelivery
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "night".parse::<DeliverySlot>().unwrap_err();
        assert_eq!(err.to_string(), "invalid delivery time: night");
        assert!("Cod".parse::<PaymentMethod>().is_err());
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(UserRole::default(), UserRole::Buyer);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
        assert_eq!(DeliverySlot::default(), DeliverySlot::Morning);
    }

    #[test]
    fn test_only_pending_is_cancellable() {
        for status in OrderStatus::ALL {
            assert_eq!(status.is_cancellable(), *status == OrderStatus::Pending);
        }
    }

    #[test]
    fn test_deserialize_rejects_unknown_variant() {
        assert!(serde_json::from_str::<PaymentMethod>("\"card\"").is_err());
    }
}
