//! Request contexts.
//!
//! [`ReadContext`] is what repositories need to read data; the
//! [`SalesChannelContext`] adds the shop and visitor state of a storefront
//! request on top of it.

use crate::entity::SalesChannel;
use crate::types::{CurrencyCode, CustomerId, LanguageId, RuleId};

/// Data access context passed to repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadContext {
    /// Language to read translated fields in. `None` = system default.
    pub language_id: Option<LanguageId>,
}

impl ReadContext {
    /// Context for system reads that happen before a storefront context exists.
    #[must_use]
    pub const fn system() -> Self {
        Self { language_id: None }
    }
}

/// Everything the storefront knows about the current request's shop and
/// visitor.
///
/// Created once per request. Everything except the sales channel record is
/// read-only; page loaders may refresh the sales channel's associations in
/// place via [`SalesChannelContext::sales_channel_mut`].
#[derive(Debug, Clone)]
pub struct SalesChannelContext {
    token: String,
    sales_channel: SalesChannel,
    currency: CurrencyCode,
    language_id: LanguageId,
    customer_id: Option<CustomerId>,
    rule_ids: Vec<RuleId>,
}

impl SalesChannelContext {
    /// Create a context for a token and sales channel.
    ///
    /// Currency and language default to the sales channel's.
    #[must_use]
    pub fn new(token: impl Into<String>, sales_channel: SalesChannel) -> Self {
        Self {
            token: token.into(),
            currency: sales_channel.currency,
            language_id: sales_channel.language_id,
            sales_channel,
            customer_id: None,
            rule_ids: Vec::new(),
        }
    }

    /// Set the rule ids that matched for this context.
    #[must_use]
    pub fn with_rule_ids(mut self, rule_ids: Vec<RuleId>) -> Self {
        self.rule_ids = rule_ids;
        self
    }

    /// Set the logged-in customer.
    #[must_use]
    pub const fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Override the context currency.
    #[must_use]
    pub const fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    /// Context token, also used as the cart token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn sales_channel(&self) -> &SalesChannel {
        &self.sales_channel
    }

    pub const fn sales_channel_mut(&mut self) -> &mut SalesChannel {
        &mut self.sales_channel
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    #[must_use]
    pub const fn language_id(&self) -> LanguageId {
        self.language_id
    }

    #[must_use]
    pub const fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// Rule ids that matched for this context.
    #[must_use]
    pub fn rule_ids(&self) -> &[RuleId] {
        &self.rule_ids
    }

    /// Data access context for repository reads made on behalf of this request.
    #[must_use]
    pub const fn read_context(&self) -> ReadContext {
        ReadContext {
            language_id: Some(self.language_id),
        }
    }

    /// Whether the rule matched for this context.
    #[must_use]
    pub fn has_rule(&self, rule_id: RuleId) -> bool {
        self.rule_ids.contains(&rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SalesChannelId;

    #[test]
    fn test_defaults_follow_sales_channel() {
        let language_id = LanguageId::random();
        let sales_channel = SalesChannel::new(
            SalesChannelId::random(),
            "Storefront",
            CurrencyCode::GBP,
            language_id,
        );
        let context = SalesChannelContext::new("abc", sales_channel);

        assert_eq!(context.token(), "abc");
        assert_eq!(context.currency(), CurrencyCode::GBP);
        assert_eq!(context.read_context().language_id, Some(language_id));
        assert!(context.customer_id().is_none());
        assert!(context.rule_ids().is_empty());
    }

    #[test]
    fn test_has_rule() {
        let rule = RuleId::random();
        let sales_channel = SalesChannel::new(
            SalesChannelId::random(),
            "Storefront",
            CurrencyCode::EUR,
            LanguageId::random(),
        );
        let context = SalesChannelContext::new("abc", sales_channel)
            .with_rule_ids(vec![rule])
            .with_currency(CurrencyCode::CHF);

        assert!(context.has_rule(rule));
        assert!(!context.has_rule(RuleId::random()));
        assert_eq!(context.currency(), CurrencyCode::CHF);
    }
}
