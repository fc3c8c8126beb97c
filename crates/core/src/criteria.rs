//! Search criteria for entity repositories.
//!
//! Criteria are storage-agnostic: the PostgreSQL repositories translate them
//! into SQL, the in-memory repository evaluates them with [`Criteria::matches`].

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::entity::{Entity, FieldValue};

/// Field equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualsFilter {
    pub field: String,
    pub value: FieldValue,
}

impl EqualsFilter {
    /// Create a filter requiring `field == value`.
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the entity satisfies this filter.
    ///
    /// Unknown fields never match.
    #[must_use]
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        entity
            .field(&self.field)
            .is_some_and(|value| value == self.value)
    }
}

/// What to fetch from a repository.
///
/// - `ids`: restrict to these ids (`None` = no restriction)
/// - `filters`: all must match
/// - `associations`: related collections to load eagerly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    ids: Option<Vec<Uuid>>,
    filters: Vec<EqualsFilter>,
    associations: BTreeSet<String>,
}

impl Criteria {
    /// Criteria matching every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria restricted to the given ids.
    #[must_use]
    pub fn with_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Uuid>,
    {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Add an equality filter.
    #[must_use]
    pub fn add_filter(mut self, filter: EqualsFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Request an association to be loaded.
    #[must_use]
    pub fn add_association(mut self, name: &str) -> Self {
        self.associations.insert(name.to_owned());
        self
    }

    /// Id restriction, if any.
    #[must_use]
    pub fn ids(&self) -> Option<&[Uuid]> {
        self.ids.as_deref()
    }

    /// Equality filters.
    #[must_use]
    pub fn filters(&self) -> &[EqualsFilter] {
        &self.filters
    }

    /// Requested associations, sorted by name.
    pub fn associations(&self) -> impl Iterator<Item = &str> {
        self.associations.iter().map(String::as_str)
    }

    /// Whether an association was requested.
    #[must_use]
    pub fn has_association(&self, name: &str) -> bool {
        self.associations.contains(name)
    }

    /// Whether the entity satisfies the id restriction and every filter.
    #[must_use]
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        let id_matches = self
            .ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&entity.id().into()));
        id_matches && self.filters.iter().all(|filter| filter.matches(entity))
    }
}
