//! Sales channel context creation.
//!
//! Every storefront request runs against a [`SalesChannelContext`]. The
//! factory loads the configured sales channel and the rules that currently
//! apply, and binds them to the visitor's context token.

use std::sync::Arc;

use shopfloor_core::{
    Criteria, EqualsFilter, ReadContext, Rule, SalesChannel, SalesChannelContext, SalesChannelId,
};
use thiserror::Error;
use tracing::instrument;

use crate::db::{EntityRepository, RepositoryError};

/// Errors that can occur when creating a context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The configured sales channel does not exist.
    #[error("sales channel {0} not found")]
    SalesChannelNotFound(SalesChannelId),

    /// The configured sales channel is switched off.
    #[error("sales channel {0} is inactive")]
    SalesChannelInactive(SalesChannelId),
}

/// Builds request contexts for one sales channel.
#[derive(Clone)]
pub struct SalesChannelContextFactory {
    sales_channel_id: SalesChannelId,
    sales_channels: Arc<dyn EntityRepository<SalesChannel>>,
    rules: Arc<dyn EntityRepository<Rule>>,
}

impl SalesChannelContextFactory {
    #[must_use]
    pub fn new(
        sales_channel_id: SalesChannelId,
        sales_channels: Arc<dyn EntityRepository<SalesChannel>>,
        rules: Arc<dyn EntityRepository<Rule>>,
    ) -> Self {
        Self {
            sales_channel_id,
            sales_channels,
            rules,
        }
    }

    /// The sales channel contexts are created for.
    #[must_use]
    pub const fn sales_channel_id(&self) -> SalesChannelId {
        self.sales_channel_id
    }

    /// Create the context for `token`.
    ///
    /// The sales channel is loaded without associations; page loaders fetch
    /// the ones they need. Every active rule is treated as matched.
    ///
    /// # Errors
    ///
    /// Returns `ContextError` if the sales channel is missing or inactive, or
    /// a repository read fails.
    #[instrument(skip_all, fields(sales_channel_id = %self.sales_channel_id))]
    pub async fn create(&self, token: String) -> Result<SalesChannelContext, ContextError> {
        let read_context = ReadContext::system();

        let sales_channel = self
            .sales_channels
            .search(&Criteria::with_ids([self.sales_channel_id]), &read_context)
            .await?
            .take(self.sales_channel_id)
            .ok_or(ContextError::SalesChannelNotFound(self.sales_channel_id))?;

        if !sales_channel.active {
            return Err(ContextError::SalesChannelInactive(self.sales_channel_id));
        }

        let rule_ids = self
            .rules
            .search(
                &Criteria::new().add_filter(EqualsFilter::new("active", true)),
                &read_context,
            )
            .await?
            .into_entities()
            .ids();

        Ok(SalesChannelContext::new(token, sales_channel).with_rule_ids(rule_ids))
    }
}
