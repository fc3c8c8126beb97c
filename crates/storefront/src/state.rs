//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::Repositories;
use crate::pages::{
    CheckoutCartPage, CheckoutCartPageLoader, PageLoadedHooks, StorefrontPageLoader,
};
use crate::services::{CartStore, SalesChannelContextFactory};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories, page loaders and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    carts: CartStore,
    contexts: SalesChannelContextFactory,
    checkout_cart: CheckoutCartPageLoader,
}

impl AppState {
    /// Create the production state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let repositories = Repositories::postgres(&pool);
        Self::with_repositories(config, repositories, Some(pool), PageLoadedHooks::new())
    }

    /// Create a state over arbitrary repositories.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `repositories` - Entity repositories to read from
    /// * `pool` - Database pool for readiness checks, if any
    /// * `hooks` - Hooks run after the checkout cart page has loaded
    #[must_use]
    pub fn with_repositories(
        config: StorefrontConfig,
        repositories: Repositories,
        pool: Option<PgPool>,
        hooks: PageLoadedHooks<CheckoutCartPage>,
    ) -> Self {
        let carts = CartStore::new(config.cart_ttl);
        let contexts = SalesChannelContextFactory::new(
            config.sales_channel_id,
            Arc::clone(&repositories.sales_channels),
            Arc::clone(&repositories.rules),
        );
        let checkout_cart = CheckoutCartPageLoader::new(
            Arc::new(StorefrontPageLoader),
            &repositories,
            Arc::new(carts.clone()),
        )
        .with_hooks(hooks);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts,
                contexts,
                checkout_cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the database connection pool, if the state is database-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Cart storage.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    /// Factory for per-request sales channel contexts.
    #[must_use]
    pub fn contexts(&self) -> &SalesChannelContextFactory {
        &self.inner.contexts
    }

    /// Loader for the checkout cart page.
    #[must_use]
    pub fn checkout_cart(&self) -> &CheckoutCartPageLoader {
        &self.inner.checkout_cart
    }
}
