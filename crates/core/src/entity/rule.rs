//! Business rule entity.
//!
//! Rules are evaluated by the rule engine when a context is created; only
//! their ids travel with the context. This record is what the engine reads.

use serde::{Deserialize, Serialize};

use super::{Entity, FieldValue};
use crate::types::RuleId;

/// A business rule payment and shipping methods can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Higher priority rules are listed first.
    pub priority: i32,
    pub active: bool,
}

impl Rule {
    /// Create an active rule with priority 0.
    #[must_use]
    pub fn new(id: RuleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            priority: 0,
            active: true,
        }
    }
}

impl Entity for Rule {
    type Id = RuleId;

    const ENTITY_NAME: &'static str = "rule";

    fn id(&self) -> RuleId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.as_uuid().into()),
            "name" => Some(self.name.as_str().into()),
            "priority" => Some(self.priority.into()),
            "active" => Some(self.active.into()),
            _ => None,
        }
    }
}
