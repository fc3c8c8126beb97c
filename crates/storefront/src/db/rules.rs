//! Rule repository.

use async_trait::async_trait;
use shopfloor_core::{Criteria, ReadContext, Rule, RuleId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::{EntityRepository, EntitySearchResult, RepositoryError, push_criteria};

const FILTER_COLUMNS: &[(&str, &str)] = &[
    ("id", "r.id"),
    ("name", "r.name"),
    ("priority", "r.priority"),
    ("active", "r.active"),
];

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    id: Uuid,
    name: String,
    priority: i32,
    active: bool,
}

impl From<RuleRow> for Rule {
    fn from(row: RuleRow) -> Self {
        Self {
            id: RuleId::new(row.id),
            name: row.name,
            priority: row.priority,
            active: row.active,
        }
    }
}

/// `PostgreSQL` repository for rules, highest priority first.
pub struct PgRuleRepository {
    pool: PgPool,
}

impl PgRuleRepository {
    /// Create a new rule repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Rule> for PgRuleRepository {
    #[instrument(skip(self, criteria, _context))]
    async fn search(
        &self,
        criteria: &Criteria,
        _context: &ReadContext,
    ) -> Result<EntitySearchResult<Rule>, RepositoryError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT r.id, r.name, r.priority, r.active FROM rule r");
        push_criteria(&mut builder, criteria, "rule", FILTER_COLUMNS)?;
        builder.push(" ORDER BY r.priority DESC, r.name");

        let rows = builder
            .build_query_as::<RuleRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(EntitySearchResult::new(
            rows.into_iter().map(Rule::from).collect(),
        ))
    }
}
