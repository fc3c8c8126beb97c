//! Entity repositories for the storefront.
//!
//! # Database: `shopfloor`
//!
//! ## Tables
//!
//! - `sales_channel` - Storefront instances
//! - `sales_channel_country` / `sales_channel_payment_method` /
//!   `sales_channel_shipping_method` - Channel assignments
//! - `country`, `payment_method`, `shipping_method` - Checkout options
//! - `rule` - Business rules methods can be scoped to
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and applied with
//! `sqlx migrate run`.
//!
//! Repositories are trait objects so page loaders can run against
//! `PostgreSQL` in production and [`InMemoryRepository`] in tests.

mod countries;
mod memory;
mod payment_methods;
mod rules;
mod sales_channels;
mod shipping_methods;

pub use memory::InMemoryRepository;
pub use payment_methods::PgPaymentMethodRepository;
pub use rules::PgRuleRepository;
pub use sales_channels::PgSalesChannelRepository;
pub use shipping_methods::PgShippingMethodRepository;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use shopfloor_core::{
    Criteria, Entity, EntityCollection, FieldValue, PaymentMethod, ReadContext, Rule,
    SalesChannel, ShippingMethod,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The criteria filter on a field the repository cannot filter by.
    #[error("unsupported filter field `{field}` for {entity}")]
    UnsupportedFilter {
        entity: &'static str,
        field: String,
    },

    /// The storage backend is unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result of a repository search.
#[derive(Debug, Clone)]
pub struct EntitySearchResult<E> {
    entities: EntityCollection<E>,
}

impl<E: Entity> EntitySearchResult<E> {
    /// Wrap the entities found by a search.
    #[must_use]
    pub const fn new(entities: EntityCollection<E>) -> Self {
        Self { entities }
    }

    /// The entities found, in storage order.
    #[must_use]
    pub const fn entities(&self) -> &EntityCollection<E> {
        &self.entities
    }

    /// Consume the result, returning the entities.
    #[must_use]
    pub fn into_entities(self) -> EntityCollection<E> {
        self.entities
    }

    /// Get a found entity by id.
    #[must_use]
    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.entities.get(id)
    }

    /// Remove and return a found entity by id.
    #[must_use]
    pub fn take(self, id: E::Id) -> Option<E> {
        self.entities.into_iter().find(|entity| entity.id() == id)
    }

    /// Number of entities found.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entities.len()
    }
}

/// Searchable storage for one entity type.
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    /// Fetch the entities matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the storage read fails or the criteria
    /// cannot be evaluated.
    async fn search(
        &self,
        criteria: &Criteria,
        context: &ReadContext,
    ) -> Result<EntitySearchResult<E>, RepositoryError>;
}

/// The repositories the storefront reads from.
#[derive(Clone)]
pub struct Repositories {
    pub sales_channels: Arc<dyn EntityRepository<SalesChannel>>,
    pub payment_methods: Arc<dyn EntityRepository<PaymentMethod>>,
    pub shipping_methods: Arc<dyn EntityRepository<ShippingMethod>>,
    pub rules: Arc<dyn EntityRepository<Rule>>,
}

impl Repositories {
    /// `PostgreSQL`-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            sales_channels: Arc::new(PgSalesChannelRepository::new(pool.clone())),
            payment_methods: Arc::new(PgPaymentMethodRepository::new(pool.clone())),
            shipping_methods: Arc::new(PgShippingMethodRepository::new(pool.clone())),
            rules: Arc::new(PgRuleRepository::new(pool.clone())),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Append a `WHERE` clause for `criteria` to `builder`.
///
/// `columns` maps filterable field names to qualified column names; filters
/// on other fields are rejected rather than interpolated.
fn push_criteria<'args>(
    builder: &mut QueryBuilder<'args, Postgres>,
    criteria: &Criteria,
    entity: &'static str,
    columns: &[(&str, &str)],
) -> Result<(), RepositoryError> {
    builder.push(" WHERE TRUE");

    if let Some(ids) = criteria.ids() {
        let id_column = column_for(entity, columns, "id")?;
        builder.push(" AND ");
        builder.push(id_column);
        builder.push(" = ANY(");
        builder.push_bind(ids.to_vec());
        builder.push(")");
    }

    for filter in criteria.filters() {
        let column = column_for(entity, columns, &filter.field)?;
        builder.push(" AND ");
        builder.push(column);
        builder.push(" = ");
        match &filter.value {
            FieldValue::Bool(value) => builder.push_bind(*value),
            FieldValue::Int(value) => builder.push_bind(*value),
            FieldValue::Uuid(value) => builder.push_bind(*value),
            FieldValue::Text(value) => builder.push_bind(value.clone()),
        };
    }

    Ok(())
}

fn column_for<'c>(
    entity: &'static str,
    columns: &[(&str, &'c str)],
    field: &str,
) -> Result<&'c str, RepositoryError> {
    columns
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, column)| *column)
        .ok_or_else(|| RepositoryError::UnsupportedFilter {
            entity,
            field: field.to_owned(),
        })
}
