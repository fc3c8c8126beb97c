//! Shipping method entity.

use serde::{Deserialize, Serialize};

use super::{Entity, FieldValue};
use crate::rules::RuleScoped;
use crate::types::{Price, RuleId, ShippingMethodId};

/// A shipping method that can be offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: String,
    pub description: Option<String>,
    /// Human readable delivery estimate (e.g., "1-3 days").
    pub delivery_time: Option<String>,
    /// Base shipping cost.
    pub price: Price,
    pub active: bool,
    /// Rules gating availability. Empty means always available.
    pub availability_rule_ids: Vec<RuleId>,
}

impl ShippingMethod {
    /// Create an active shipping method without availability rules.
    #[must_use]
    pub fn new(id: ShippingMethodId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            delivery_time: None,
            price,
            active: true,
            availability_rule_ids: Vec::new(),
        }
    }
}

impl Entity for ShippingMethod {
    type Id = ShippingMethodId;

    const ENTITY_NAME: &'static str = "shipping_method";

    fn id(&self) -> ShippingMethodId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.as_uuid().into()),
            "name" => Some(self.name.as_str().into()),
            "active" => Some(self.active.into()),
            _ => None,
        }
    }
}

impl RuleScoped for ShippingMethod {
    fn availability_rule_ids(&self) -> &[RuleId] {
        &self.availability_rule_ids
    }
}
