//! In-process stores for tests and local development.
//!
//! They enforce the same rules as the `PostgreSQL` schema: case-insensitive
//! email uniqueness and conditional cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use dairy_farm_core::{Email, Order, OrderId, OrderStats, OrderStatus, UserId, UserRole};

use super::{OrderStore, RepositoryError, UserStore};
use crate::models::{NewUser, ProfileChanges, User};

#[derive(Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory [`UserStore`].
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, StoredUser>>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(
    users: &HashMap<UserId, StoredUser>,
    email: &Email,
    except: Option<UserId>,
) -> bool {
    users
        .values()
        .any(|s| Some(s.user.id) != except && s.user.email.eq_ignore_case(email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;

        if email_taken(&users, &new.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            first_name: new.first_name.into_inner(),
            last_name: new.last_name.into_inner(),
            email: new.email,
            phone: new.phone.into_inner(),
            role: UserRole::Buyer,
            created_at: now,
            updated_at: now,
        };

        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new.password_hash,
            },
        );

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|s| s.user.clone()))
    }

    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|s| s.user.email == *email)
            .map(|s| (s.user.clone(), s.password_hash.clone())))
    }

    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|s| s.password_hash.clone()))
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;

        if let Some(email) = &changes.email
            && email_taken(&users, email, Some(id))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let stored = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(first_name) = changes.first_name {
            stored.user.first_name = first_name.into_inner();
        }
        if let Some(last_name) = changes.last_name {
            stored.user.last_name = last_name.into_inner();
        }
        if let Some(email) = changes.email {
            stored.user.email = email;
        }
        if let Some(phone) = changes.phone {
            stored.user.phone = phone.into_inner();
        }
        if let Some(password_hash) = changes.password_hash {
            stored.password_hash = password_hash;
        }
        stored.user.updated_at = Utc::now();

        Ok(stored.user.clone())
    }

    async fn set_role(&self, email: &Email, role: UserRole) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        let stored = users
            .values_mut()
            .find(|s| s.user.email.eq_ignore_case(email))
            .ok_or(RepositoryError::NotFound)?;

        stored.user.role = role;
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// In-memory [`OrderStore`].
#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an order's status, as staff tooling would.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        order.order_status = status;
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(RepositoryError::Conflict("order already exists".to_owned()));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut mine: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(a.id.cmp(&b.id)));
        Ok(mine)
    }

    async fn cancel_if_pending(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.order_status == OrderStatus::Pending => {
                order.order_status = OrderStatus::Cancelled;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let orders = self.orders.read().await;
        let mut stats = OrderStats::default();

        for order in orders.values() {
            stats.total_orders += 1;
            match order.order_status {
                OrderStatus::Pending => stats.pending_orders += 1,
                OrderStatus::Delivered => {
                    stats.delivered_orders += 1;
                    stats.total_revenue += order.order_total;
                }
                _ => {}
            }
        }
        stats.total_revenue = stats.total_revenue.normalize();

        Ok(stats)
    }
}
