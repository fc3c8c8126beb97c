//! Checkout cart page.
//!
//! Assembles everything the cart page shows: the shipping countries of the
//! sales channel, the payment and shipping methods the visitor may choose
//! from, and the current cart. Before reading countries, the context's
//! sales channel is refreshed so the page reflects storage rather than
//! whatever the context was built with.

use std::sync::Arc;

use serde::Serialize;
use shopfloor_core::{
    AvailabilityRules, Cart, CountryCollection, Criteria, Entity, EntityCollection, EqualsFilter,
    IsEligible, PaymentMethod, PaymentMethodCollection, ReadContext, SalesChannel,
    SalesChannelAssociation, SalesChannelContext, ShippingMethod, ShippingMethodCollection,
};
use tracing::{debug, instrument, warn};

use super::hooks::{PageLoadedEvent, PageLoadedHook, PageLoadedHooks};
use super::{GenericPageLoader, Page, PageError, PageRequest};
use crate::db::{EntityRepository, RepositoryError, Repositories};
use crate::services::CartService;

/// Name of the event dispatched after the cart page has loaded.
pub const CHECKOUT_CART_PAGE_LOADED: &str = "checkout-cart.page.loaded";

/// Event handed to checkout cart page hooks.
pub type CheckoutCartPageLoadedEvent<'a> = PageLoadedEvent<'a, CheckoutCartPage>;

/// View-model of the checkout cart page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutCartPage {
    #[serde(flatten)]
    pub page: Page,
    /// Countries the sales channel ships to.
    pub shipping_countries: CountryCollection,
    /// Active payment methods eligible for the context.
    pub payment_methods: PaymentMethodCollection,
    /// Active shipping methods eligible for the context.
    pub shipping_methods: ShippingMethodCollection,
    pub cart: Cart,
}

/// Loads [`CheckoutCartPage`]s.
pub struct CheckoutCartPageLoader {
    generic_loader: Arc<dyn GenericPageLoader>,
    sales_channels: Arc<dyn EntityRepository<SalesChannel>>,
    payment_methods: Arc<dyn EntityRepository<PaymentMethod>>,
    shipping_methods: Arc<dyn EntityRepository<ShippingMethod>>,
    cart_service: Arc<dyn CartService>,
    payment_eligibility: Arc<dyn IsEligible<PaymentMethod>>,
    shipping_eligibility: Arc<dyn IsEligible<ShippingMethod>>,
    hooks: PageLoadedHooks<CheckoutCartPage>,
}

impl CheckoutCartPageLoader {
    /// Create a loader that filters methods by their availability rules and
    /// has no hooks registered.
    #[must_use]
    pub fn new(
        generic_loader: Arc<dyn GenericPageLoader>,
        repositories: &Repositories,
        cart_service: Arc<dyn CartService>,
    ) -> Self {
        Self {
            generic_loader,
            sales_channels: Arc::clone(&repositories.sales_channels),
            payment_methods: Arc::clone(&repositories.payment_methods),
            shipping_methods: Arc::clone(&repositories.shipping_methods),
            cart_service,
            payment_eligibility: Arc::new(AvailabilityRules),
            shipping_eligibility: Arc::new(AvailabilityRules),
            hooks: PageLoadedHooks::new(),
        }
    }

    /// Replace the payment method eligibility predicate.
    #[must_use]
    pub fn with_payment_eligibility(
        mut self,
        eligibility: impl IsEligible<PaymentMethod> + 'static,
    ) -> Self {
        self.payment_eligibility = Arc::new(eligibility);
        self
    }

    /// Replace the shipping method eligibility predicate.
    #[must_use]
    pub fn with_shipping_eligibility(
        mut self,
        eligibility: impl IsEligible<ShippingMethod> + 'static,
    ) -> Self {
        self.shipping_eligibility = Arc::new(eligibility);
        self
    }

    /// Replace the page-loaded hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: PageLoadedHooks<CheckoutCartPage>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Register one more page-loaded hook.
    pub fn register_hook(&mut self, hook: impl PageLoadedHook<CheckoutCartPage> + 'static) {
        self.hooks.register(hook);
    }

    /// Load the checkout cart page.
    ///
    /// Refreshes the sales channel's associations on `context` in place,
    /// then reads payment methods, shipping methods and the cart, and finally
    /// runs the page-loaded hooks once.
    ///
    /// # Errors
    ///
    /// Any failing step aborts the load: base page, sales channel refresh,
    /// method lookups, cart read, or a hook.
    #[instrument(
        skip_all,
        fields(sales_channel_id = %context.sales_channel().id, path = %request.path())
    )]
    pub async fn load(
        &self,
        request: &PageRequest,
        context: &mut SalesChannelContext,
    ) -> Result<CheckoutCartPage, PageError> {
        let page = self.generic_loader.load(request, context).await?;

        let read_context = context.read_context();
        update_sales_channel(
            self.sales_channels.as_ref(),
            context.sales_channel_mut(),
            &read_context,
        )
        .await?;

        let shipping_countries = context
            .sales_channel()
            .countries
            .clone()
            .unwrap_or_else(|| {
                warn!("sales channel has no countries loaded, showing none");
                CountryCollection::new()
            });

        let payment_methods = select_active_eligible(
            self.payment_methods.as_ref(),
            self.payment_eligibility.as_ref(),
            context,
        )
        .await?;

        let shipping_methods = select_active_eligible(
            self.shipping_methods.as_ref(),
            self.shipping_eligibility.as_ref(),
            context,
        )
        .await?;

        let cart = self.cart_service.get_cart(context.token(), context).await?;

        let mut page = CheckoutCartPage {
            page,
            shipping_countries,
            payment_methods,
            shipping_methods,
            cart,
        };

        let mut event = CheckoutCartPageLoadedEvent {
            name: CHECKOUT_CART_PAGE_LOADED,
            page: &mut page,
            context: &*context,
            request,
        };
        self.hooks.dispatch(&mut event)?;

        debug!(
            countries = page.shipping_countries.len(),
            payment_methods = page.payment_methods.len(),
            shipping_methods = page.shipping_methods.len(),
            line_items = page.cart.line_items.len(),
            "checkout cart page loaded"
        );

        Ok(page)
    }
}

/// Fetch every active entity from `repository` and keep those `eligibility`
/// accepts for the context, preserving repository order.
///
/// # Errors
///
/// Returns `RepositoryError` if the search fails.
#[instrument(skip_all, fields(entity = E::ENTITY_NAME))]
pub async fn select_active_eligible<E: Entity>(
    repository: &dyn EntityRepository<E>,
    eligibility: &dyn IsEligible<E>,
    context: &SalesChannelContext,
) -> Result<EntityCollection<E>, RepositoryError> {
    let criteria = Criteria::new().add_filter(EqualsFilter::new("active", true));
    let active = repository
        .search(&criteria, &context.read_context())
        .await?
        .into_entities();

    let eligible = active.filter_eligible(eligibility, context);
    debug!(
        active = active.len(),
        eligible = eligible.len(),
        "selected eligible entities"
    );
    Ok(eligible)
}

/// Re-read `sales_channel` with its countries, payment methods and shipping
/// methods, and copy onto it every association the fresh read returned.
///
/// Associations the read did not return keep their current value, whether
/// that is a loaded collection or nothing. All other fields are left alone.
///
/// # Errors
///
/// Returns `PageError::SalesChannelNotFound` if the sales channel no longer
/// exists, or `PageError::Repository` if the read fails.
#[instrument(skip_all, fields(sales_channel_id = %sales_channel.id))]
pub async fn update_sales_channel(
    repository: &dyn EntityRepository<SalesChannel>,
    sales_channel: &mut SalesChannel,
    context: &ReadContext,
) -> Result<(), PageError> {
    let criteria = SalesChannelAssociation::ALL.iter().fold(
        Criteria::with_ids([sales_channel.id]),
        |criteria, association| criteria.add_association(association.as_str()),
    );

    let fresh = repository
        .search(&criteria, context)
        .await?
        .take(sales_channel.id)
        .ok_or(PageError::SalesChannelNotFound(sales_channel.id))?;

    let kept = sales_channel.merge_associations(fresh);
    if !kept.is_empty() {
        debug!(?kept, "associations missing from refresh, keeping current values");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::Uri;
    use shopfloor_core::{
        Country, CountryId, CurrencyCode, EligibleFn, LanguageId, LineItem, PaymentMethodId,
        Price, Rule, RuleId, SalesChannelId, ShippingMethodId,
    };

    use super::*;
    use crate::db::{EntitySearchResult, InMemoryRepository};
    use crate::pages::{HookError, HookFn, StorefrontPageLoader};
    use crate::services::{CartError, CartStore};

    // =========================================================================
    // Test doubles
    // =========================================================================

    /// Cart service that counts reads.
    #[derive(Default)]
    struct CountingCarts {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CartService for CountingCarts {
        async fn get_cart(
            &self,
            token: &str,
            context: &SalesChannelContext,
        ) -> Result<Cart, CartError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Cart::empty(token, context.currency()))
        }
    }

    /// Repository whose every search fails.
    struct FailingRepository;

    #[async_trait]
    impl<E: Entity> EntityRepository<E> for FailingRepository {
        async fn search(
            &self,
            _criteria: &Criteria,
            _context: &ReadContext,
        ) -> Result<EntitySearchResult<E>, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }
    }

    /// In-memory repository that records the criteria it was asked for.
    struct RecordingRepository<E> {
        inner: InMemoryRepository<E>,
        seen: Mutex<Vec<Criteria>>,
    }

    impl<E: Entity> RecordingRepository<E> {
        fn new(entities: Vec<E>) -> Self {
            Self {
                inner: InMemoryRepository::new(entities),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<Criteria> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<E: Entity> EntityRepository<E> for RecordingRepository<E> {
        async fn search(
            &self,
            criteria: &Criteria,
            context: &ReadContext,
        ) -> Result<EntitySearchResult<E>, RepositoryError> {
            self.seen.lock().unwrap().push(criteria.clone());
            self.inner.search(criteria, context).await
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    fn sales_channel() -> SalesChannel {
        SalesChannel::new(
            SalesChannelId::random(),
            "Demo Shop",
            CurrencyCode::EUR,
            LanguageId::random(),
        )
    }

    fn country(iso: &str) -> Country {
        Country::new(CountryId::random(), iso, iso)
    }

    fn payment(name: &str, rules: Vec<RuleId>) -> PaymentMethod {
        let mut method = PaymentMethod::new(PaymentMethodId::random(), name);
        method.availability_rule_ids = rules;
        method
    }

    fn shipping(name: &str, rules: Vec<RuleId>) -> ShippingMethod {
        let mut method = ShippingMethod::new(
            ShippingMethodId::random(),
            name,
            Price::from_cents(495, CurrencyCode::EUR),
        );
        method.availability_rule_ids = rules;
        method
    }

    fn repositories(
        stored: Vec<SalesChannel>,
        payments: Vec<PaymentMethod>,
        shippings: Vec<ShippingMethod>,
    ) -> Repositories {
        Repositories {
            sales_channels: Arc::new(InMemoryRepository::new(stored)),
            payment_methods: Arc::new(InMemoryRepository::new(payments)),
            shipping_methods: Arc::new(InMemoryRepository::new(shippings)),
            rules: Arc::new(InMemoryRepository::<Rule>::new(Vec::new())),
        }
    }

    fn loader(repositories: &Repositories, carts: Arc<dyn CartService>) -> CheckoutCartPageLoader {
        CheckoutCartPageLoader::new(Arc::new(StorefrontPageLoader), repositories, carts)
    }

    fn request() -> PageRequest {
        PageRequest::get(Uri::from_static("/checkout/cart"))
    }

    // =========================================================================
    // select_active_eligible
    // =========================================================================

    #[tokio::test]
    async fn test_selects_active_methods_eligible_for_context() {
        let matched = RuleId::random();
        let unmatched = RuleId::random();
        let p1 = payment("Invoice", Vec::new());
        let p2 = payment("Card", vec![matched]);
        let p3 = payment("Direct debit", vec![unmatched]);
        let mut inactive = payment("Cash", Vec::new());
        inactive.active = false;

        let repository =
            InMemoryRepository::new(vec![p1.clone(), p2.clone(), p3, inactive]);
        let ctx = SalesChannelContext::new("token", sales_channel()).with_rule_ids(vec![matched]);

        let selected =
            select_active_eligible::<PaymentMethod>(&repository, &AvailabilityRules, &ctx)
                .await
                .unwrap();

        assert_eq!(selected.ids(), vec![p1.id, p2.id]);
    }

    #[tokio::test]
    async fn test_select_queries_active_only() {
        let repository = RecordingRepository::new(vec![payment("Invoice", Vec::new())]);
        let ctx = SalesChannelContext::new("token", sales_channel());

        select_active_eligible::<PaymentMethod>(&repository, &AvailabilityRules, &ctx)
            .await
            .unwrap();

        let seen = repository.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].filters(),
            [EqualsFilter::new("active", true)].as_slice()
        );
        assert!(seen[0].ids().is_none());
    }

    #[tokio::test]
    async fn test_select_propagates_repository_errors() {
        let ctx = SalesChannelContext::new("token", sales_channel());
        let result =
            select_active_eligible::<PaymentMethod>(&FailingRepository, &AvailabilityRules, &ctx)
                .await;

        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }

    // =========================================================================
    // update_sales_channel
    // =========================================================================

    #[tokio::test]
    async fn test_update_requests_all_associations_by_id() {
        let channel = sales_channel();
        let repository = RecordingRepository::new(vec![channel.clone()]);
        let mut current = channel.clone();

        update_sales_channel(&repository, &mut current, &ReadContext::system())
            .await
            .unwrap();

        let seen = repository.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].ids(), Some([channel.id.as_uuid()].as_slice()));
        for association in SalesChannelAssociation::ALL {
            assert!(seen[0].has_association(association.as_str()));
        }
    }

    #[tokio::test]
    async fn test_update_replaces_stale_associations() {
        let (de, at, ch) = (country("DE"), country("AT"), country("CH"));
        let mut stored = sales_channel();
        stored.countries = Some(vec![at.clone(), ch.clone()].into());
        stored.payment_methods = Some(PaymentMethodCollection::new());
        stored.shipping_methods = Some(ShippingMethodCollection::new());

        let mut current = stored.clone();
        current.countries = Some(vec![de].into());
        current.name = "Renamed locally".to_string();

        let repository = InMemoryRepository::new(vec![stored]);
        update_sales_channel(&repository, &mut current, &ReadContext::system())
            .await
            .unwrap();

        let countries = current.countries.unwrap();
        assert_eq!(countries.ids(), vec![at.id, ch.id]);
        assert_eq!(current.payment_methods, Some(PaymentMethodCollection::new()));
        assert_eq!(current.name, "Renamed locally");
    }

    #[tokio::test]
    async fn test_update_keeps_associations_missing_from_refresh() {
        let de = country("DE");
        let stored = sales_channel();
        let mut current = stored.clone();
        current.countries = Some(vec![de.clone()].into());

        let repository = InMemoryRepository::new(vec![stored]);
        update_sales_channel(&repository, &mut current, &ReadContext::system())
            .await
            .unwrap();

        assert_eq!(current.countries.unwrap().ids(), vec![de.id]);
        assert!(current.payment_methods.is_none());
        assert!(current.shipping_methods.is_none());
    }

    #[tokio::test]
    async fn test_update_fails_for_missing_sales_channel() {
        let mut current = sales_channel();
        let repository = InMemoryRepository::<SalesChannel>::new(Vec::new());

        let err = update_sales_channel(&repository, &mut current, &ReadContext::system())
            .await
            .unwrap_err();

        assert!(matches!(err, PageError::SalesChannelNotFound(id) if id == current.id));
    }

    // =========================================================================
    // CheckoutCartPageLoader::load
    // =========================================================================

    #[tokio::test]
    async fn test_load_assembles_page_from_fresh_data() {
        let r1 = RuleId::random();
        let r2 = RuleId::random();
        let (p1, p2, p3) = (
            payment("Invoice", Vec::new()),
            payment("Card", vec![r1]),
            payment("Direct debit", vec![r2]),
        );
        let (s1, s2) = (shipping("Standard", Vec::new()), shipping("Express", vec![r2]));
        let (at, ch) = (country("AT"), country("CH"));

        let mut stored = sales_channel();
        stored.countries = Some(vec![at.clone(), ch.clone()].into());
        let mut stale = stored.clone();
        stale.countries = Some(vec![country("DE")].into());

        let repositories = repositories(
            vec![stored.clone()],
            vec![p1.clone(), p2.clone(), p3],
            vec![s1.clone(), s2],
        );
        let carts = Arc::new(CountingCarts::default());
        let loader = loader(&repositories, carts.clone());
        let mut ctx = SalesChannelContext::new("tok-1", stale).with_rule_ids(vec![r1]);

        let page = loader.load(&request(), &mut ctx).await.unwrap();

        assert_eq!(page.shipping_countries.ids(), vec![at.id, ch.id]);
        assert_eq!(page.payment_methods.ids(), vec![p1.id, p2.id]);
        assert_eq!(page.shipping_methods.ids(), vec![s1.id]);
        assert_eq!(page.cart.token, "tok-1");
        assert_eq!(page.page.meta.robots, "noindex,follow");
        assert_eq!(carts.calls.load(Ordering::SeqCst), 1);

        // The context carries the refreshed associations afterwards.
        assert_eq!(
            ctx.sales_channel().countries.as_ref().map(EntityCollection::ids),
            Some(vec![at.id, ch.id])
        );
    }

    #[tokio::test]
    async fn test_load_shows_no_countries_when_none_loaded() {
        let stored = sales_channel();
        let repositories = repositories(vec![stored.clone()], Vec::new(), Vec::new());
        let loader = loader(&repositories, Arc::new(CountingCarts::default()));
        let mut ctx = SalesChannelContext::new("tok", stored);

        let page = loader.load(&request(), &mut ctx).await.unwrap();

        assert!(page.shipping_countries.is_empty());
        assert!(page.payment_methods.is_empty());
        assert!(page.shipping_methods.is_empty());
        assert!(ctx.sales_channel().countries.is_none());
    }

    #[tokio::test]
    async fn test_load_returns_stored_cart() {
        let stored = sales_channel();
        let repositories = repositories(vec![stored.clone()], Vec::new(), Vec::new());
        let store = CartStore::new(std::time::Duration::from_secs(60));
        let mut cart = Cart::empty("tok-cart", CurrencyCode::EUR);
        cart.line_items.push(LineItem {
            id: "line-1".to_string(),
            reference_id: None,
            label: "Espresso beans".to_string(),
            quantity: 2,
            unit_price: Price::from_cents(1_250, CurrencyCode::EUR),
            total_price: Price::from_cents(2_500, CurrencyCode::EUR),
        });
        store.save(cart.clone()).await.unwrap();

        let loader = loader(&repositories, Arc::new(store));
        let mut ctx = SalesChannelContext::new("tok-cart", stored);
        let page = loader.load(&request(), &mut ctx).await.unwrap();

        assert_eq!(page.cart, cart);
    }

    #[tokio::test]
    async fn test_hook_runs_once_and_can_replace_fields() {
        let mut stored = sales_channel();
        stored.countries = Some(vec![country("AT")].into());
        let invoice = payment("Invoice", Vec::new());
        let express = shipping("Express", Vec::new());
        let repositories = repositories(
            vec![stored.clone()],
            vec![invoice.clone()],
            vec![express.clone()],
        );
        let runs = Arc::new(AtomicUsize::new(0));

        let mut loader = loader(&repositories, Arc::new(CountingCarts::default()));
        let counter = Arc::clone(&runs);
        loader.register_hook(HookFn::new(
            "replace-cart",
            move |event: &mut CheckoutCartPageLoadedEvent<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                assert_eq!(event.name, CHECKOUT_CART_PAGE_LOADED);
                // Hooks observe the fully populated page.
                assert!(event.context.sales_channel().countries.is_some());
                assert_eq!(event.page.shipping_countries.len(), 1);
                assert_eq!(event.page.payment_methods.ids(), vec![invoice.id]);
                assert_eq!(event.page.shipping_methods.ids(), vec![express.id]);
                event.page.cart = Cart::empty("replaced", CurrencyCode::CHF);
                Ok(())
            },
        ));

        let mut ctx = SalesChannelContext::new("tok", stored);
        let page = loader.load(&request(), &mut ctx).await.unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(page.cart.token, "replaced");
    }

    #[tokio::test]
    async fn test_failing_hook_aborts_load() {
        let stored = sales_channel();
        let repositories = repositories(vec![stored.clone()], Vec::new(), Vec::new());
        let mut hooks = PageLoadedHooks::new();
        hooks.register_fn("reject", |_event: &mut CheckoutCartPageLoadedEvent<'_>| {
            Err(HookError::new("reject", "cart locked"))
        });
        let loader =
            loader(&repositories, Arc::new(CountingCarts::default())).with_hooks(hooks);

        let mut ctx = SalesChannelContext::new("tok", stored);
        let err = loader.load(&request(), &mut ctx).await.unwrap_err();

        assert!(matches!(err, PageError::Hook(ref e) if e.hook == "reject"));
    }

    #[tokio::test]
    async fn test_missing_sales_channel_aborts_before_cart() {
        let repositories = repositories(Vec::new(), Vec::new(), Vec::new());
        let carts = Arc::new(CountingCarts::default());
        let loader = loader(&repositories, carts.clone());
        let mut ctx = SalesChannelContext::new("tok", sales_channel());

        let err = loader.load(&request(), &mut ctx).await.unwrap_err();

        assert!(matches!(err, PageError::SalesChannelNotFound(_)));
        assert_eq!(carts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_method_lookup_failure_aborts_before_cart() {
        let stored = sales_channel();
        let mut repositories = repositories(vec![stored.clone()], Vec::new(), Vec::new());
        repositories.shipping_methods = Arc::new(FailingRepository);
        let carts = Arc::new(CountingCarts::default());
        let loader = loader(&repositories, carts.clone());
        let mut ctx = SalesChannelContext::new("tok", stored);

        let err = loader.load(&request(), &mut ctx).await.unwrap_err();

        assert!(matches!(
            err,
            PageError::Repository(RepositoryError::Unavailable(_))
        ));
        assert_eq!(carts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_eligibility_predicate() {
        let stored = sales_channel();
        let (invoice, card) = (payment("Invoice", Vec::new()), payment("Card", Vec::new()));
        let repositories = repositories(
            vec![stored.clone()],
            vec![invoice, card.clone()],
            Vec::new(),
        );
        let loader = loader(&repositories, Arc::new(CountingCarts::default()))
            .with_payment_eligibility(EligibleFn(|method: &PaymentMethod, _: &SalesChannelContext| {
                method.name == "Card"
            }));

        let mut ctx = SalesChannelContext::new("tok", stored);
        let page = loader.load(&request(), &mut ctx).await.unwrap();

        assert_eq!(page.payment_methods.ids(), vec![card.id]);
    }
}
