//! Page-loaded hooks.
//!
//! After a loader has built its page it hands the page to every registered
//! hook, in registration order, as a mutable reference. Hooks may replace
//! any field of the page; changes are visible to later hooks and to the
//! caller. A failing hook aborts the load.

use std::fmt;
use std::sync::Arc;

use shopfloor_core::SalesChannelContext;
use thiserror::Error;
use tracing::debug;

use super::PageRequest;

/// A hook failed while handling a page-loaded event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hook `{hook}` failed: {message}")]
pub struct HookError {
    pub hook: String,
    pub message: String,
}

impl HookError {
    #[must_use]
    pub fn new(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Notification that a page finished loading.
pub struct PageLoadedEvent<'a, P> {
    /// Event name, e.g. `checkout-cart.page.loaded`.
    pub name: &'static str,
    /// The page; hooks may modify it.
    pub page: &'a mut P,
    pub context: &'a SalesChannelContext,
    pub request: &'a PageRequest,
}

impl<P: fmt::Debug> fmt::Debug for PageLoadedEvent<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLoadedEvent")
            .field("name", &self.name)
            .field("page", &self.page)
            .field("path", &self.request.path())
            .finish_non_exhaustive()
    }
}

/// Extension point run after a page of type `P` has loaded.
pub trait PageLoadedHook<P>: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Handle the event.
    ///
    /// # Errors
    ///
    /// Returns `HookError` to abort the page load.
    fn on_loaded(&self, event: &mut PageLoadedEvent<'_, P>) -> Result<(), HookError>;
}

/// Adapter turning a named closure into a [`PageLoadedHook`].
pub struct HookFn<F> {
    name: String,
    f: F,
}

impl<F> HookFn<F> {
    #[must_use]
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<P, F> PageLoadedHook<P> for HookFn<F>
where
    F: Fn(&mut PageLoadedEvent<'_, P>) -> Result<(), HookError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_loaded(&self, event: &mut PageLoadedEvent<'_, P>) -> Result<(), HookError> {
        (self.f)(event)
    }
}

/// Ordered list of hooks for one page type.
pub struct PageLoadedHooks<P> {
    hooks: Vec<Arc<dyn PageLoadedHook<P>>>,
}

impl<P> PageLoadedHooks<P> {
    /// Create an empty hook list.
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook. Hooks run in the order they were registered.
    pub fn register(&mut self, hook: impl PageLoadedHook<P> + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    /// Append a closure hook.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut PageLoadedEvent<'_, P>) -> Result<(), HookError> + Send + Sync + 'static,
        P: 'static,
    {
        self.register(HookFn::new(name, f));
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook against the event, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first `HookError`; later hooks do not run.
    pub fn dispatch(&self, event: &mut PageLoadedEvent<'_, P>) -> Result<(), HookError> {
        for hook in &self.hooks {
            debug!(event = event.name, hook = hook.name(), "running page hook");
            hook.on_loaded(event)?;
        }
        Ok(())
    }
}

impl<P> Default for PageLoadedHooks<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for PageLoadedHooks<P> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<P> fmt::Debug for PageLoadedHooks<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| hook.name()))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use axum::http::Uri;
    use shopfloor_core::{CurrencyCode, LanguageId, SalesChannel, SalesChannelId};

    use super::*;

    fn context() -> SalesChannelContext {
        let sales_channel = SalesChannel::new(
            SalesChannelId::random(),
            "Storefront",
            CurrencyCode::EUR,
            LanguageId::random(),
        );
        SalesChannelContext::new("token", sales_channel)
    }

    #[test]
    fn test_hooks_run_in_order_and_see_earlier_changes() {
        let mut hooks: PageLoadedHooks<Vec<&'static str>> = PageLoadedHooks::new();
        hooks.register_fn("first", |event| {
            event.page.push("first");
            Ok(())
        });
        hooks.register_fn("second", |event| {
            assert_eq!(event.page.as_slice(), ["first"]);
            event.page.push("second");
            Ok(())
        });

        let ctx = context();
        let request = PageRequest::get(Uri::from_static("/"));
        let mut page = Vec::new();
        let mut event = PageLoadedEvent {
            name: "test.page.loaded",
            page: &mut page,
            context: &ctx,
            request: &request,
        };

        hooks.dispatch(&mut event).unwrap();
        assert_eq!(page, vec!["first", "second"]);
    }

    #[test]
    fn test_failing_hook_stops_dispatch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut hooks: PageLoadedHooks<u32> = PageLoadedHooks::new();

        let seen = Arc::clone(&calls);
        hooks.register_fn("broken", move |_event| {
            seen.lock().unwrap().push("broken");
            Err(HookError::new("broken", "boom"))
        });
        let seen = Arc::clone(&calls);
        hooks.register_fn("after", move |_event| {
            seen.lock().unwrap().push("after");
            Ok(())
        });

        let ctx = context();
        let request = PageRequest::get(Uri::from_static("/"));
        let mut page = 0;
        let mut event = PageLoadedEvent {
            name: "test.page.loaded",
            page: &mut page,
            context: &ctx,
            request: &request,
        };

        let err = hooks.dispatch(&mut event).unwrap_err();
        assert_eq!(err.hook, "broken");
        assert_eq!(err.to_string(), "hook `broken` failed: boom");
        assert_eq!(*calls.lock().unwrap(), vec!["broken"]);
    }

    #[test]
    fn test_debug_lists_hook_names() {
        let mut hooks: PageLoadedHooks<u32> = PageLoadedHooks::default();
        hooks.register_fn("audit", |_event| Ok(()));
        assert_eq!(hooks.len(), 1);
        assert_eq!(format!("{hooks:?}"), "[\"audit\"]");
    }
}
