//! Sales channel entity.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{
    CountryCollection, Entity, FieldValue, PaymentMethodCollection, ShippingMethodCollection,
};
use crate::criteria::Criteria;
use crate::merge::merge_present;
use crate::types::{
    CountryId, CurrencyCode, LanguageId, PaymentMethodId, SalesChannelId, ShippingMethodId,
};

/// Associations a sales channel can be loaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalesChannelAssociation {
    Countries,
    PaymentMethods,
    ShippingMethods,
}

impl SalesChannelAssociation {
    /// All associations, in load order.
    pub const ALL: [Self; 3] = [Self::Countries, Self::PaymentMethods, Self::ShippingMethods];

    /// Association name used in criteria.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Countries => "countries",
            Self::PaymentMethods => "payment_methods",
            Self::ShippingMethods => "shipping_methods",
        }
    }
}

impl fmt::Display for SalesChannelAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storefront instance (one brand/region's shop).
///
/// The association fields are `None` until loaded. `Some(empty)` means the
/// association was loaded and the channel has nothing assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesChannel {
    pub id: SalesChannelId,
    pub name: String,
    pub active: bool,
    pub currency: CurrencyCode,
    pub language_id: LanguageId,
    /// Default country for new customers.
    pub country_id: Option<CountryId>,
    /// Default payment method.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Default shipping method.
    pub shipping_method_id: Option<ShippingMethodId>,
    pub countries: Option<CountryCollection>,
    pub payment_methods: Option<PaymentMethodCollection>,
    pub shipping_methods: Option<ShippingMethodCollection>,
}

impl SalesChannel {
    /// Create an active sales channel with no associations loaded.
    #[must_use]
    pub fn new(
        id: SalesChannelId,
        name: impl Into<String>,
        currency: CurrencyCode,
        language_id: LanguageId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            currency,
            language_id,
            country_id: None,
            payment_method_id: None,
            shipping_method_id: None,
            countries: None,
            payment_methods: None,
            shipping_methods: None,
        }
    }

    /// Whether the given association is loaded.
    #[must_use]
    pub const fn has_association(&self, association: SalesChannelAssociation) -> bool {
        match association {
            SalesChannelAssociation::Countries => self.countries.is_some(),
            SalesChannelAssociation::PaymentMethods => self.payment_methods.is_some(),
            SalesChannelAssociation::ShippingMethods => self.shipping_methods.is_some(),
        }
    }

    /// Copy the associations present on `fresh` onto `self`.
    ///
    /// Associations absent on `fresh` leave the current value untouched.
    /// Returns the associations that were absent and therefore kept.
    pub fn merge_associations(&mut self, fresh: Self) -> Vec<SalesChannelAssociation> {
        let mut kept = Vec::new();
        if !merge_present(&mut self.countries, fresh.countries) {
            kept.push(SalesChannelAssociation::Countries);
        }
        if !merge_present(&mut self.payment_methods, fresh.payment_methods) {
            kept.push(SalesChannelAssociation::PaymentMethods);
        }
        if !merge_present(&mut self.shipping_methods, fresh.shipping_methods) {
            kept.push(SalesChannelAssociation::ShippingMethods);
        }
        kept
    }
}

impl Entity for SalesChannel {
    type Id = SalesChannelId;

    const ENTITY_NAME: &'static str = "sales_channel";

    fn id(&self) -> SalesChannelId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.as_uuid().into()),
            "name" => Some(self.name.as_str().into()),
            "active" => Some(self.active.into()),
            "currency" => Some(self.currency.code().into()),
            _ => None,
        }
    }

    fn retain_associations(&mut self, criteria: &Criteria) {
        for association in SalesChannelAssociation::ALL {
            if criteria.has_association(association.as_str()) {
                continue;
            }
            match association {
                SalesChannelAssociation::Countries => self.countries = None,
                SalesChannelAssociation::PaymentMethods => self.payment_methods = None,
                SalesChannelAssociation::ShippingMethods => self.shipping_methods = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Country, PaymentMethod};

    fn channel() -> SalesChannel {
        SalesChannel::new(
            SalesChannelId::random(),
            "Storefront",
            CurrencyCode::EUR,
            LanguageId::random(),
        )
    }

    #[test]
    fn test_merge_overwrites_present_associations() {
        let mut current = channel();
        current.countries = Some(vec![Country::new(CountryId::random(), "Austria", "AT")].into());

        let mut fresh = current.clone();
        let germany = Country::new(CountryId::random(), "Germany", "DE");
        fresh.countries = Some(vec![germany.clone()].into());
        fresh.payment_methods = Some(PaymentMethodCollection::new());

        let kept = current.merge_associations(fresh);

        assert_eq!(kept, vec![SalesChannelAssociation::ShippingMethods]);
        assert_eq!(
            current.countries.as_ref().map(CountryCollection::ids),
            Some(vec![germany.id])
        );
        assert_eq!(current.payment_methods, Some(PaymentMethodCollection::new()));
        assert!(current.shipping_methods.is_none());
    }

    #[test]
    fn test_merge_keeps_existing_when_fresh_is_absent() {
        let mut current = channel();
        let austria = Country::new(CountryId::random(), "Austria", "AT");
        current.countries = Some(vec![austria.clone()].into());

        let mut fresh = current.clone();
        fresh.countries = None;

        current.merge_associations(fresh);
        assert_eq!(
            current.countries.as_ref().map(CountryCollection::ids),
            Some(vec![austria.id])
        );
    }

    #[test]
    fn test_retain_associations_drops_unrequested() {
        let mut sales_channel = channel();
        sales_channel.countries = Some(CountryCollection::new());
        sales_channel.payment_methods = Some(
            vec![PaymentMethod::new(PaymentMethodId::random(), "Invoice")].into(),
        );

        sales_channel.retain_associations(&Criteria::new().add_association("countries"));

        assert!(sales_channel.has_association(SalesChannelAssociation::Countries));
        assert!(!sales_channel.has_association(SalesChannelAssociation::PaymentMethods));
        assert!(!sales_channel.has_association(SalesChannelAssociation::ShippingMethods));
    }
}
