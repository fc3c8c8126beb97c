//! Storefront services.

pub mod cart;
pub mod context;

pub use cart::{CartError, CartService, CartStore};
pub use context::{ContextError, SalesChannelContextFactory};
