//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{
    MemoryOrderStore, MemoryUserStore, OrderStore, PgOrderStore, PgUserStore, UserStore,
};
use crate::services::auth::{AuthService, RevocationList, TokenIssuer};
use crate::services::orders::OrderService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, configuration and token keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    users: Arc<dyn UserStore>,
    orders: Arc<dyn OrderStore>,
    tokens: TokenIssuer,
    revoked: RevocationList,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let users = Arc::new(PgUserStore::new(pool.clone()));
        let orders = Arc::new(PgOrderStore::new(pool));
        Self::with_stores(config, users, orders)
    }

    /// Create application state over empty in-memory stores.
    #[must_use]
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryOrderStore::new()),
        )
    }

    /// Create application state over arbitrary stores.
    #[must_use]
    pub fn with_stores(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret_bytes());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                orders,
                tokens,
                revoked: RevocationList::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    #[must_use]
    pub fn revoked(&self) -> &RevocationList {
        &self.inner.revoked
    }

    /// Authentication service over this state's stores.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            self.inner.users.as_ref(),
            &self.inner.tokens,
            &self.inner.revoked,
        )
    }

    /// Order service over this state's stores.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.inner.orders.as_ref(), self.inner.users.as_ref())
    }
}
