//! Cart service.
//!
//! Carts are looked up by context token. Pricing and line-item handling
//! belong to the cart engine that writes carts; the storefront only reads
//! them.
//!
//! [`CartStore`] keeps carts in a `moka` cache that evicts carts left
//! untouched for the configured idle time.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use shopfloor_core::{Cart, SalesChannelContext};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur when reading carts.
#[derive(Debug, Error)]
pub enum CartError {
    /// The context token is empty.
    #[error("invalid cart token")]
    InvalidToken,

    /// The cart backend failed.
    #[error("cart storage error: {0}")]
    Storage(String),
}

/// Source of the current cart for a context token.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Get the cart for `token`, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the token is invalid or the backend fails.
    async fn get_cart(&self, token: &str, context: &SalesChannelContext)
    -> Result<Cart, CartError>;
}

/// In-process cart storage keyed by context token.
#[derive(Clone)]
pub struct CartStore {
    cache: Cache<String, Cart>,
}

impl CartStore {
    /// Create a store that forgets carts idle for longer than `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(ttl)
            .build();

        Self { cache }
    }

    /// Store a cart under its token, replacing any previous cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidToken` if the cart has an empty token.
    pub async fn save(&self, cart: Cart) -> Result<(), CartError> {
        if cart.token.is_empty() {
            return Err(CartError::InvalidToken);
        }
        self.cache.insert(cart.token.clone(), cart).await;
        Ok(())
    }
}

#[async_trait]
impl CartService for CartStore {
    #[instrument(skip(self, context))]
    async fn get_cart(
        &self,
        token: &str,
        context: &SalesChannelContext,
    ) -> Result<Cart, CartError> {
        if token.is_empty() {
            return Err(CartError::InvalidToken);
        }

        if let Some(cart) = self.cache.get(token).await {
            return Ok(cart);
        }

        debug!("no stored cart, starting an empty one");
        let cart = Cart::empty(token, context.currency());
        self.cache.insert(token.to_owned(), cart.clone()).await;
        Ok(cart)
    }
}
