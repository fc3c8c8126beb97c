//! Storefront entities and ordered entity collections.
//!
//! Every record a repository can return implements [`Entity`]. Repositories
//! hand back an [`EntityCollection`] which keeps the order the storage layer
//! produced and is keyed by the entity id.

mod cart;
mod country;
mod payment_method;
mod rule;
mod sales_channel;
mod shipping_method;

pub use cart::{Cart, CartPrice, LineItem};
pub use country::Country;
pub use payment_method::PaymentMethod;
pub use rule::Rule;
pub use sales_channel::{SalesChannel, SalesChannelAssociation};
pub use shipping_method::ShippingMethod;

use core::fmt;
use core::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::criteria::Criteria;

/// Collection of countries.
pub type CountryCollection = EntityCollection<Country>;
/// Collection of payment methods.
pub type PaymentMethodCollection = EntityCollection<PaymentMethod>;
/// Collection of shipping methods.
pub type ShippingMethodCollection = EntityCollection<ShippingMethod>;

/// A scalar field value used by equality filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Uuid(Uuid),
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A record that can be stored in a repository and searched by criteria.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Typed identity of the entity.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Into<Uuid> + Send + Sync;

    /// Storage name of the entity, used in logs and errors.
    const ENTITY_NAME: &'static str;

    /// The entity's identity.
    fn id(&self) -> Self::Id;

    /// Look up a scalar field by name for filter evaluation.
    ///
    /// Returns `None` for unknown fields, which never match a filter.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Drop associations the criteria did not ask for.
    ///
    /// Storage only loads associations on request; in-memory stores call this
    /// so their results look the same.
    fn retain_associations(&mut self, _criteria: &Criteria) {}
}

/// An ordered set of entities keyed by identity.
///
/// Iteration order is insertion order. Inserting an entity whose id is
/// already present replaces the existing element in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCollection<E> {
    elements: Vec<E>,
}

impl<E> Default for EntityCollection<E> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<E: Entity> EntityCollection<E> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any element with the same id.
    pub fn insert(&mut self, entity: E) {
        let id = entity.id();
        if let Some(existing) = self.elements.iter_mut().find(|e| e.id() == id) {
            *existing = entity;
        } else {
            self.elements.push(entity);
        }
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Ids of all elements, in collection order.
    #[must_use]
    pub fn ids(&self) -> Vec<E::Id> {
        self.elements.iter().map(Entity::id).collect()
    }

    /// Keep the elements matching `predicate`, preserving order.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&E) -> bool) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .filter(|e| predicate(e))
                .cloned()
                .collect(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the collection has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    /// Consume the collection, returning its elements in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<E> {
        self.elements
    }
}

impl<E: Entity> FromIterator<E> for EntityCollection<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut collection = Self::new();
        for entity in iter {
            collection.insert(entity);
        }
        collection
    }
}

impl<E: Entity> From<Vec<E>> for EntityCollection<E> {
    fn from(elements: Vec<E>) -> Self {
        elements.into_iter().collect()
    }
}

impl<E> IntoIterator for EntityCollection<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a EntityCollection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountryId;

    fn country(iso: &str) -> Country {
        Country::new(CountryId::random(), iso, iso)
    }

    #[test]
    fn test_insert_keeps_order_and_replaces_by_id() {
        let de = country("DE");
        let at = country("AT");
        let mut collection: CountryCollection = vec![de.clone(), at.clone()].into();

        let mut renamed = de.clone();
        renamed.name = "Germany".to_string();
        collection.insert(renamed);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.ids(), vec![de.id, at.id]);
        assert_eq!(
            collection.get(de.id).map(|c| c.name.as_str()),
            Some("Germany")
        );
    }

    #[test]
    fn test_filter_preserves_order() {
        let a = country("DE");
        let mut b = country("AT");
        b.active = false;
        let c = country("CH");
        let collection: CountryCollection = vec![a.clone(), b, c.clone()].into();

        let active = collection.filter(|country| country.active);
        assert_eq!(active.ids(), vec![a.id, c.id]);
    }

    #[test]
    fn test_serializes_as_array() {
        let collection: CountryCollection = vec![country("DE")].into();
        let json = serde_json::to_value(&collection).unwrap_or_default();
        assert!(json.is_array());
        assert_eq!(json.as_array().map(Vec::len), Some(1));
    }
}
