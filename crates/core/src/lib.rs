//! Dairy Farm Core - Shared domain types.
//!
//! This crate provides the types shared by the Dairy Farm components:
//! - `api` - The REST backend (auth + orders)
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP. This keeps the business rules testable in
//! isolation and lets every binary agree on them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated identity fields, statuses and orders
//! - [`catalog`] - The fixed product offering and order defaults

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
