//! # Product Catalog - Domain Model
//!
//! Core entities for the product catalog. These types are the single source
//! of truth across all layers: persistence, cache encoding and the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store-assigned product identifier
pub type ProductId = i64;

/// Fields every create request must carry
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "category", "price"];

// =============================================================================
// ENTITIES
// =============================================================================

/// A product record as owned by the record store.
///
/// `price` serializes as a JSON number, never a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// Validated write payload, not yet assigned an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
        }
    }

    /// Attach the id the store generated for this product
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
        }
    }

    /// Validate a decoded request body.
    ///
    /// A field that is absent or `null` counts as missing. A body that is
    /// not a JSON object (or no body at all) is missing every field. A
    /// price given as a numeric string such as `"12.5"` is accepted.
    ///
    /// # Errors
    ///
    /// `MissingFields` when any required field is absent, `InvalidFields`
    /// when all are present but one has the wrong JSON type.
    pub fn from_json(body: Option<&Value>) -> Result<Self, DomainError> {
        let Some(Value::Object(fields)) = body else {
            return Err(DomainError::MissingFields);
        };

        let all_present = REQUIRED_FIELDS
            .iter()
            .all(|key| fields.get(*key).is_some_and(|v| !v.is_null()));
        if !all_present {
            return Err(DomainError::MissingFields);
        }

        let mut fields = fields.clone();
        if let Some(price) = fields.get_mut("price") {
            coerce_numeric_string(price);
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::InvalidFields(e.to_string()))
    }
}

/// Replace a string holding a finite decimal with the number itself.
fn coerce_numeric_string(value: &mut Value) {
    let parsed = match value {
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    if let Some(number) = parsed.and_then(serde_json::Number::from_f64) {
        *value = Value::Number(number);
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Missing fields")]
    MissingFields,

    #[error("Invalid fields: {0}")]
    InvalidFields(String),
}
