//! Sales channel repository.
//!
//! Associations (`countries`, `payment_methods`, `shipping_methods`) are
//! loaded only when the criteria request them. A requested association is
//! always `Some`, possibly empty; an unrequested one stays `None`.

use async_trait::async_trait;
use shopfloor_core::{
    CountryId, Criteria, CurrencyCode, LanguageId, PaymentMethod, PaymentMethodCollection,
    PaymentMethodId, ReadContext, SalesChannel, SalesChannelAssociation, SalesChannelId,
    ShippingMethod, ShippingMethodCollection, ShippingMethodId,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::payment_methods::{self, PaymentMethodRow};
use super::shipping_methods::{self, ShippingMethodRow};
use super::{EntityRepository, EntitySearchResult, RepositoryError, countries, push_criteria};

const FILTER_COLUMNS: &[(&str, &str)] = &[
    ("id", "sc.id"),
    ("name", "sc.name"),
    ("active", "sc.active"),
    ("currency", "sc.currency"),
];

#[derive(Debug, sqlx::FromRow)]
struct SalesChannelRow {
    id: Uuid,
    name: String,
    active: bool,
    currency: String,
    language_id: Uuid,
    country_id: Option<Uuid>,
    payment_method_id: Option<Uuid>,
    shipping_method_id: Option<Uuid>,
}

impl TryFrom<SalesChannelRow> for SalesChannel {
    type Error = RepositoryError;

    fn try_from(row: SalesChannelRow) -> Result<Self, Self::Error> {
        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("sales channel {}: {e}", row.id))
        })?;

        let mut sales_channel = Self::new(
            SalesChannelId::new(row.id),
            row.name,
            currency,
            LanguageId::new(row.language_id),
        );
        sales_channel.active = row.active;
        sales_channel.country_id = row.country_id.map(CountryId::new);
        sales_channel.payment_method_id = row.payment_method_id.map(PaymentMethodId::new);
        sales_channel.shipping_method_id = row.shipping_method_id.map(ShippingMethodId::new);
        Ok(sales_channel)
    }
}

/// `PostgreSQL` repository for sales channels.
pub struct PgSalesChannelRepository {
    pool: PgPool,
}

impl PgSalesChannelRepository {
    /// Create a new sales channel repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_association(
        &self,
        sales_channel: &mut SalesChannel,
        association: SalesChannelAssociation,
    ) -> Result<(), RepositoryError> {
        match association {
            SalesChannelAssociation::Countries => {
                sales_channel.countries =
                    Some(countries::for_sales_channel(&self.pool, sales_channel.id).await?);
            }
            SalesChannelAssociation::PaymentMethods => {
                sales_channel.payment_methods =
                    Some(self.assigned_payment_methods(sales_channel.id).await?);
            }
            SalesChannelAssociation::ShippingMethods => {
                sales_channel.shipping_methods =
                    Some(self.assigned_shipping_methods(sales_channel.id).await?);
            }
        }
        Ok(())
    }

    async fn assigned_payment_methods(
        &self,
        sales_channel_id: SalesChannelId,
    ) -> Result<PaymentMethodCollection, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM payment_method pm \
             JOIN sales_channel_payment_method scpm ON scpm.payment_method_id = pm.id \
             WHERE scpm.sales_channel_id = $1 \
             ORDER BY pm.position, pm.name",
            payment_methods::SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PaymentMethodRow>(&sql)
            .bind(sales_channel_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PaymentMethod::from).collect())
    }

    async fn assigned_shipping_methods(
        &self,
        sales_channel_id: SalesChannelId,
    ) -> Result<ShippingMethodCollection, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM shipping_method sm \
             JOIN sales_channel_shipping_method scsm ON scsm.shipping_method_id = sm.id \
             WHERE scsm.sales_channel_id = $1 \
             ORDER BY sm.name",
            shipping_methods::SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ShippingMethodRow>(&sql)
            .bind(sales_channel_id)
            .fetch_all(&self.pool)
            .await?;

        let methods = rows
            .into_iter()
            .map(ShippingMethod::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(methods.into())
    }
}

#[async_trait]
impl EntityRepository<SalesChannel> for PgSalesChannelRepository {
    #[instrument(skip(self, criteria, _context))]
    async fn search(
        &self,
        criteria: &Criteria,
        _context: &ReadContext,
    ) -> Result<EntitySearchResult<SalesChannel>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT sc.id, sc.name, sc.active, sc.currency, sc.language_id, \
             sc.country_id, sc.payment_method_id, sc.shipping_method_id \
             FROM sales_channel sc",
        );
        push_criteria(&mut builder, criteria, "sales_channel", FILTER_COLUMNS)?;
        builder.push(" ORDER BY sc.name");

        let rows = builder
            .build_query_as::<SalesChannelRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut sales_channels = Vec::with_capacity(rows.len());
        for row in rows {
            let mut sales_channel = SalesChannel::try_from(row)?;
            for association in SalesChannelAssociation::ALL {
                if criteria.has_association(association.as_str()) {
                    self.load_association(&mut sales_channel, association)
                        .await?;
                }
            }
            sales_channels.push(sales_channel);
        }

        Ok(EntitySearchResult::new(sales_channels.into()))
    }
}
