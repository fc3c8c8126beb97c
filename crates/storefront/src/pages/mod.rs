//! Page loaders.
//!
//! A page loader turns a request and a [`SalesChannelContext`] into a page
//! view-model. Every storefront page starts from the base [`Page`] produced
//! by a [`GenericPageLoader`]; specialized loaders such as
//! [`CheckoutCartPageLoader`] decorate it and then let registered hooks
//! enrich the result before it is rendered.

pub mod checkout_cart;
pub mod hooks;

pub use checkout_cart::{
    CHECKOUT_CART_PAGE_LOADED, CheckoutCartPage, CheckoutCartPageLoadedEvent,
    CheckoutCartPageLoader, select_active_eligible, update_sales_channel,
};
pub use hooks::{HookError, HookFn, PageLoadedEvent, PageLoadedHook, PageLoadedHooks};

use async_trait::async_trait;
use axum::http::{HeaderMap, Method, Uri};
use serde::Serialize;
use shopfloor_core::{CurrencyCode, SalesChannelContext, SalesChannelId};
use thiserror::Error;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::services::CartError;

/// Errors that abort a page load.
#[derive(Debug, Error)]
pub enum PageError {
    /// A repository read failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The cart could not be read.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// A page-loaded hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The context's sales channel no longer exists in storage.
    #[error("sales channel {0} not found")]
    SalesChannelNotFound(SalesChannelId),

    /// The base page could not be built.
    #[error("page loader error: {0}")]
    Loader(String),
}

/// The parts of the HTTP request page loaders look at.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl PageRequest {
    /// Create a request descriptor.
    #[must_use]
    pub const fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// A `GET` request for `uri` without headers.
    #[must_use]
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri, HeaderMap::new())
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// A header value, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Page metadata for the document head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaInformation {
    pub title: String,
    pub description: Option<String>,
    /// Robots directive (e.g., "noindex,follow").
    pub robots: String,
    pub canonical_path: String,
}

/// Header data shared by every storefront page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderPagelet {
    pub sales_channel_name: String,
    pub currency: CurrencyCode,
    pub logged_in: bool,
}

/// The base view-model every storefront page extends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub meta: MetaInformation,
    pub header: HeaderPagelet,
}

/// Builds the base page for any storefront request.
#[async_trait]
pub trait GenericPageLoader: Send + Sync {
    /// Load the base page.
    ///
    /// # Errors
    ///
    /// Returns `PageError` if any data the base page needs cannot be loaded.
    async fn load(
        &self,
        request: &PageRequest,
        context: &SalesChannelContext,
    ) -> Result<Page, PageError>;
}

/// Default base page: metadata from the request path, header from the context.
#[derive(Debug, Clone, Default)]
pub struct StorefrontPageLoader;

/// Paths under these prefixes are kept out of search indexes.
const NOINDEX_PREFIXES: &[&str] = &["/checkout", "/account", "/api"];

#[async_trait]
impl GenericPageLoader for StorefrontPageLoader {
    #[instrument(skip_all, fields(path = %request.path()))]
    async fn load(
        &self,
        request: &PageRequest,
        context: &SalesChannelContext,
    ) -> Result<Page, PageError> {
        let sales_channel = context.sales_channel();
        let path = request.path();

        let robots = if NOINDEX_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
        {
            "noindex,follow"
        } else {
            "index,follow"
        };

        Ok(Page {
            meta: MetaInformation {
                title: sales_channel.name.clone(),
                description: None,
                robots: robots.to_string(),
                canonical_path: path.to_string(),
            },
            header: HeaderPagelet {
                sales_channel_name: sales_channel.name.clone(),
                currency: context.currency(),
                logged_in: context.customer_id().is_some(),
            },
        })
    }
}
