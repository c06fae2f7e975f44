//! Dairy Farm API library.
//!
//! The REST backend for ordering dairy products: account registration and
//! bearer-token login, self-service profiles, and per-user orders with
//! cancellation. The binary in `main.rs` only wires configuration, telemetry
//! and the listener around [`routes::router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
