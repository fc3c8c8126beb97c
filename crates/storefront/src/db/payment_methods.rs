//! Payment method repository.

use async_trait::async_trait;
use shopfloor_core::{Criteria, PaymentMethod, PaymentMethodId, ReadContext, RuleId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::{EntityRepository, EntitySearchResult, RepositoryError, push_criteria};

pub(super) const SELECT_COLUMNS: &str =
    "pm.id, pm.name, pm.description, pm.position, pm.active, pm.availability_rule_ids";

const FILTER_COLUMNS: &[(&str, &str)] = &[
    ("id", "pm.id"),
    ("name", "pm.name"),
    ("position", "pm.position"),
    ("active", "pm.active"),
];

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PaymentMethodRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    position: i32,
    active: bool,
    availability_rule_ids: Vec<Uuid>,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: PaymentMethodId::new(row.id),
            name: row.name,
            description: row.description,
            position: row.position,
            active: row.active,
            availability_rule_ids: row
                .availability_rule_ids
                .into_iter()
                .map(RuleId::new)
                .collect(),
        }
    }
}

/// `PostgreSQL` repository for payment methods, ordered by position.
pub struct PgPaymentMethodRepository {
    pool: PgPool,
}

impl PgPaymentMethodRepository {
    /// Create a new payment method repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<PaymentMethod> for PgPaymentMethodRepository {
    #[instrument(skip(self, criteria, _context))]
    async fn search(
        &self,
        criteria: &Criteria,
        _context: &ReadContext,
    ) -> Result<EntitySearchResult<PaymentMethod>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SELECT_COLUMNS} FROM payment_method pm"
        ));
        push_criteria(&mut builder, criteria, "payment_method", FILTER_COLUMNS)?;
        builder.push(" ORDER BY pm.position, pm.name");

        let rows = builder
            .build_query_as::<PaymentMethodRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(EntitySearchResult::new(
            rows.into_iter().map(PaymentMethod::from).collect(),
        ))
    }
}
