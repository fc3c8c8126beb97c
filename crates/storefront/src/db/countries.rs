//! Country reads.
//!
//! Countries are only read through their sales channel assignment.

use shopfloor_core::{Country, CountryCollection, CountryId, SalesChannelId};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct CountryRow {
    id: Uuid,
    name: String,
    iso: String,
    iso3: Option<String>,
    position: i32,
    active: bool,
    shipping_available: bool,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Self {
            id: CountryId::new(row.id),
            name: row.name,
            iso: row.iso,
            iso3: row.iso3,
            position: row.position,
            active: row.active,
            shipping_available: row.shipping_available,
        }
    }
}

/// Countries assigned to a sales channel, by position then name.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub(super) async fn for_sales_channel(
    pool: &PgPool,
    sales_channel_id: SalesChannelId,
) -> Result<CountryCollection, RepositoryError> {
    let rows = sqlx::query_as::<_, CountryRow>(
        r"
        SELECT c.id, c.name, c.iso, c.iso3, c.position, c.active, c.shipping_available
        FROM country c
        JOIN sales_channel_country scc ON scc.country_id = c.id
        WHERE scc.sales_channel_id = $1
        ORDER BY c.position, c.name
        ",
    )
    .bind(sales_channel_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Country::from).collect())
}
