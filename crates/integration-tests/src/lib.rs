//! Integration tests for Shopfloor.
//!
//! Tests drive the storefront router in-process with
//! `tower::ServiceExt::oneshot`, backed by in-memory repositories and an
//! in-memory session store, so no database is needed.
//!
//! ```bash
//! cargo test -p shopfloor-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use secrecy::SecretString;
use shopfloor_core::{
    Country, CountryId, CurrencyCode, LanguageId, PaymentMethod, PaymentMethodId, Price, Rule,
    RuleId, SalesChannel, SalesChannelId, ShippingMethod, ShippingMethodId,
};
use shopfloor_storefront::config::StorefrontConfig;
use shopfloor_storefront::db::{InMemoryRepository, Repositories};
use shopfloor_storefront::middleware::create_session_layer;
use shopfloor_storefront::pages::{CheckoutCartPage, PageLoadedHooks};
use shopfloor_storefront::routes;
use shopfloor_storefront::state::AppState;
use tower_sessions::MemoryStore;

/// A seeded shop: one sales channel with countries, methods and rules.
pub struct TestShop {
    pub sales_channel: SalesChannel,
    pub countries: Vec<Country>,
    pub payment_methods: Vec<PaymentMethod>,
    pub shipping_methods: Vec<ShippingMethod>,
    pub rules: Vec<Rule>,
}

impl TestShop {
    /// A shop with two shipping countries and a mix of rule-scoped methods.
    ///
    /// - Payment: "Invoice" (unscoped), "Card" (active rule),
    ///   "Direct debit" (inactive rule), "Cash" (inactive method)
    /// - Shipping: "Standard" (unscoped), "Express" (inactive rule)
    #[must_use]
    pub fn seeded() -> Self {
        let active_rule = Rule::new(RuleId::random(), "Customers in the EU");
        let mut inactive_rule = Rule::new(RuleId::random(), "Wholesale customers");
        inactive_rule.active = false;

        let countries = vec![
            Country::new(CountryId::random(), "Austria", "AT"),
            Country::new(CountryId::random(), "Switzerland", "CH"),
        ];

        let invoice = PaymentMethod::new(PaymentMethodId::random(), "Invoice");
        let mut card = PaymentMethod::new(PaymentMethodId::random(), "Card");
        card.availability_rule_ids = vec![active_rule.id];
        let mut debit = PaymentMethod::new(PaymentMethodId::random(), "Direct debit");
        debit.availability_rule_ids = vec![inactive_rule.id];
        let mut cash = PaymentMethod::new(PaymentMethodId::random(), "Cash");
        cash.active = false;

        let standard = ShippingMethod::new(
            ShippingMethodId::random(),
            "Standard",
            Price::from_cents(495, CurrencyCode::EUR),
        );
        let mut express = ShippingMethod::new(
            ShippingMethodId::random(),
            "Express",
            Price::from_cents(1_495, CurrencyCode::EUR),
        );
        express.availability_rule_ids = vec![inactive_rule.id];

        let mut sales_channel = SalesChannel::new(
            SalesChannelId::random(),
            "Demo Shop",
            CurrencyCode::EUR,
            LanguageId::random(),
        );
        sales_channel.countries = Some(countries.clone().into());

        Self {
            sales_channel,
            countries,
            payment_methods: vec![invoice, card, debit, cash],
            shipping_methods: vec![standard, express],
            rules: vec![active_rule, inactive_rule],
        }
    }

    /// In-memory repositories holding the shop's data.
    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories {
            sales_channels: Arc::new(InMemoryRepository::new(vec![self.sales_channel.clone()])),
            payment_methods: Arc::new(InMemoryRepository::new(self.payment_methods.clone())),
            shipping_methods: Arc::new(InMemoryRepository::new(self.shipping_methods.clone())),
            rules: Arc::new(InMemoryRepository::new(self.rules.clone())),
        }
    }

    /// Application state serving this shop's sales channel.
    #[must_use]
    pub fn state(&self, hooks: PageLoadedHooks<CheckoutCartPage>) -> AppState {
        AppState::with_repositories(
            config(self.sales_channel.id),
            self.repositories(),
            None,
            hooks,
        )
    }
}

/// Configuration for a test instance serving `sales_channel_id`.
#[must_use]
pub fn config(sales_channel_id: SalesChannelId) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/shopfloor_test"),
        host: [127, 0, 0, 1].into(),
        port: 3000,
        base_url: "http://localhost:3000"
            .parse()
            .expect("static test url is valid"),
        sales_channel_id,
        cart_ttl: Duration::from_secs(300),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The storefront router with in-memory sessions, ready for `oneshot`.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(MemoryStore::default(), state.config());
    routes::routes().layer(session_layer).with_state(state)
}
