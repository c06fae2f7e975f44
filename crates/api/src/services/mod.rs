//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, logout, profile and password management,
//!   plus token issuing and revocation
//! - `orders` - Order creation, listing, cancellation and statistics
//!
//! Services borrow their stores from [`crate::state::AppState`] and are
//! constructed per request.

pub mod auth;
pub mod orders;

use std::collections::BTreeMap;

/// Per-field validation messages, keyed by request field name.
pub type FieldErrors = BTreeMap<String, String>;
