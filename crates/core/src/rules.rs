//! Eligibility predicates.
//!
//! Payment and shipping methods are offered only when they are eligible for
//! the current context. Eligibility is a capability: anything implementing
//! [`IsEligible`] can narrow a collection, so new criteria plug in without
//! touching the call sites that filter.

use std::sync::Arc;

use crate::context::SalesChannelContext;
use crate::entity::{Entity, EntityCollection};
use crate::types::RuleId;

/// Entities whose availability is gated by business rules.
pub trait RuleScoped {
    /// Rules gating availability. Empty means always available.
    fn availability_rule_ids(&self) -> &[RuleId];
}

/// Decides whether an entity may be offered in a context.
pub trait IsEligible<E>: Send + Sync {
    fn is_eligible(&self, entity: &E, context: &SalesChannelContext) -> bool;
}

/// Keeps entities with no availability rules, or with at least one rule that
/// matched for the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityRules;

impl<E: RuleScoped> IsEligible<E> for AvailabilityRules {
    fn is_eligible(&self, entity: &E, context: &SalesChannelContext) -> bool {
        let rule_ids = entity.availability_rule_ids();
        rule_ids.is_empty() || rule_ids.iter().any(|id| context.has_rule(*id))
    }
}

/// Adapter turning a closure into an [`IsEligible`] predicate.
pub struct EligibleFn<F>(pub F);

impl<E, F> IsEligible<E> for EligibleFn<F>
where
    F: Fn(&E, &SalesChannelContext) -> bool + Send + Sync,
{
    fn is_eligible(&self, entity: &E, context: &SalesChannelContext) -> bool {
        (self.0)(entity, context)
    }
}

/// Eligible only if every inner predicate agrees. Empty means always eligible.
pub struct AllOf<E> {
    predicates: Vec<Arc<dyn IsEligible<E>>>,
}

impl<E> AllOf<E> {
    /// Create an empty conjunction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate.
    #[must_use]
    pub fn with(mut self, predicate: impl IsEligible<E> + 'static) -> Self {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether no predicates were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<E> Default for AllOf<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> IsEligible<E> for AllOf<E> {
    fn is_eligible(&self, entity: &E, context: &SalesChannelContext) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.is_eligible(entity, context))
    }
}

impl<E: Entity> EntityCollection<E> {
    /// Keep the elements eligible for the context, preserving order.
    #[must_use]
    pub fn filter_eligible(
        &self,
        predicate: &dyn IsEligible<E>,
        context: &SalesChannelContext,
    ) -> Self {
        self.filter(|entity| predicate.is_eligible(entity, context))
    }
}
