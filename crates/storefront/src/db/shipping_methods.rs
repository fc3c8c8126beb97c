//! Shipping method repository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shopfloor_core::{
    CurrencyCode, Criteria, Price, ReadContext, RuleId, ShippingMethod, ShippingMethodId,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::{EntityRepository, EntitySearchResult, RepositoryError, push_criteria};

pub(super) const SELECT_COLUMNS: &str = "sm.id, sm.name, sm.description, sm.delivery_time, \
     sm.price, sm.currency, sm.active, sm.availability_rule_ids";

const FILTER_COLUMNS: &[(&str, &str)] = &[
    ("id", "sm.id"),
    ("name", "sm.name"),
    ("active", "sm.active"),
];

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ShippingMethodRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    delivery_time: Option<String>,
    price: Decimal,
    currency: String,
    active: bool,
    availability_rule_ids: Vec<Uuid>,
}

impl TryFrom<ShippingMethodRow> for ShippingMethod {
    type Error = RepositoryError;

    fn try_from(row: ShippingMethodRow) -> Result<Self, Self::Error> {
        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("shipping method {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ShippingMethodId::new(row.id),
            name: row.name,
            description: row.description,
            delivery_time: row.delivery_time,
            price: Price::new(row.price, currency),
            active: row.active,
            availability_rule_ids: row
                .availability_rule_ids
                .into_iter()
                .map(RuleId::new)
                .collect(),
        })
    }
}

/// `PostgreSQL` repository for shipping methods, ordered by name.
pub struct PgShippingMethodRepository {
    pool: PgPool,
}

impl PgShippingMethodRepository {
    /// Create a new shipping method repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<ShippingMethod> for PgShippingMethodRepository {
    #[instrument(skip(self, criteria, _context))]
    async fn search(
        &self,
        criteria: &Criteria,
        _context: &ReadContext,
    ) -> Result<EntitySearchResult<ShippingMethod>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SELECT_COLUMNS} FROM shipping_method sm"
        ));
        push_criteria(&mut builder, criteria, "shipping_method", FILTER_COLUMNS)?;
        builder.push(" ORDER BY sm.name");

        let rows = builder
            .build_query_as::<ShippingMethodRow>()
            .fetch_all(&self.pool)
            .await?;

        let methods = rows
            .into_iter()
            .map(ShippingMethod::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EntitySearchResult::new(methods.into()))
    }
}
