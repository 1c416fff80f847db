//! Request payloads for creating and updating products
//!
//! Unknown JSON fields are ignored on deserialization. Validation runs
//! before anything reaches the store.

use serde::Deserialize;

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

impl NewProduct {
    /// Validates the payload
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name(&self.name).or_else(|| validate_price(self.price))
    }
}

/// Partial update payload. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ProductPatch {
    /// Validates only the fields that are present.
    pub fn validate(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(validate_name)
            .or_else(|| self.price.and_then(validate_price))
    }
}

fn validate_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        Some("name must not be empty".to_string())
    } else {
        None
    }
}

fn validate_price(price: f64) -> Option<String> {
    if !price.is_finite() {
        Some("price must be a finite number".to_string())
    } else if price < 0.0 {
        Some("price must not be negative".to_string())
    } else {
        None
    }
}
