//! Payment method entity.

use serde::{Deserialize, Serialize};

use super::{Entity, FieldValue};
use crate::rules::RuleScoped;
use crate::types::{PaymentMethodId, RuleId};

/// A payment method that can be offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub description: Option<String>,
    /// Sort position in the checkout.
    pub position: i32,
    pub active: bool,
    /// Rules gating availability. Empty means always available.
    pub availability_rule_ids: Vec<RuleId>,
}

impl PaymentMethod {
    /// Create an active payment method without availability rules.
    #[must_use]
    pub fn new(id: PaymentMethodId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            position: 1,
            active: true,
            availability_rule_ids: Vec::new(),
        }
    }
}

impl Entity for PaymentMethod {
    type Id = PaymentMethodId;

    const ENTITY_NAME: &'static str = "payment_method";

    fn id(&self) -> PaymentMethodId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.as_uuid().into()),
            "name" => Some(self.name.as_str().into()),
            "position" => Some(self.position.into()),
            "active" => Some(self.active.into()),
            _ => None,
        }
    }
}

impl RuleScoped for PaymentMethod {
    fn availability_rule_ids(&self) -> &[RuleId] {
        &self.availability_rule_ids
    }
}
