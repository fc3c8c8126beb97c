//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, remembers the context token)
//!
//! The [`StorefrontContext`] extractor runs inside the handlers that need a
//! sales channel context.

pub mod context;
pub mod request_id;
pub mod session;

pub use context::{CONTEXT_TOKEN_HEADER, StorefrontContext};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, postgres_session_store};
