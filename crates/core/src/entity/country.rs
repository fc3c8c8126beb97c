//! Country entity.

use serde::{Deserialize, Serialize};

use super::{Entity, FieldValue};
use crate::types::CountryId;

/// A country a sales channel can ship to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// Display name (e.g., "Germany").
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso: String,
    /// ISO 3166-1 alpha-3 code.
    pub iso3: Option<String>,
    /// Sort position in country selects.
    pub position: i32,
    pub active: bool,
    /// Whether orders may be shipped to this country.
    pub shipping_available: bool,
}

impl Country {
    /// Create an active, shippable country.
    #[must_use]
    pub fn new(id: CountryId, name: impl Into<String>, iso: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            iso: iso.into(),
            iso3: None,
            position: 1,
            active: true,
            shipping_available: true,
        }
    }
}

impl Entity for Country {
    type Id = CountryId;

    const ENTITY_NAME: &'static str = "country";

    fn id(&self) -> CountryId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.as_uuid().into()),
            "name" => Some(self.name.as_str().into()),
            "iso" => Some(self.iso.as_str().into()),
            "position" => Some(self.position.into()),
            "active" => Some(self.active.into()),
            "shipping_available" => Some(self.shipping_available.into()),
            _ => None,
        }
    }
}
