//! Domain models and response shapes for the API.

pub mod order;
pub mod user;

pub use order::OrderResponse;
pub use user::{NewUser, ProfileChanges, User, UserResponse, UserSummary};
