//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Checkout
//! GET  /checkout/cart          - Cart page (HTML)
//! GET  /api/checkout/cart      - Cart page (JSON, for headless clients)
//! ```
//!
//! Cart routes need the session layer; see [`crate::middleware::session`].

pub mod checkout;
pub mod health;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/cart", get(checkout::cart_page))
}

/// Create the headless API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/checkout/cart", get(checkout::cart_page_json))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/checkout", checkout_routes())
        .nest("/api", api_routes())
}
