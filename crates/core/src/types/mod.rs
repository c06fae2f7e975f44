//! Core types for Dairy Farm.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod name;
pub mod order;
pub mod password;
pub mod phone;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use name::{NameError, PersonName};
pub use order::{
    DeliveryAddress, LineItem, LineItemError, MAX_SPECIAL_INSTRUCTIONS, NewOrder, Order, OrderStats,
    OrderTotalTooLarge, min_quantity, order_total,
};
pub use password::{
    MIN_PASSWORD_LENGTH, PASSWORD_SPECIAL_CHARS, PasswordError, validate_password_strength,
};
pub use phone::{Phone, PhoneError, clean_phone};
pub use status::*;
