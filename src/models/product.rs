//! Product record

use serde::{Deserialize, Serialize};

use super::requests::{NewProduct, ProductPatch};

/// A catalog product as persisted by the store.
///
/// `id` is assigned by the store on creation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

impl Product {
    /// Builds a product from a validated create payload and a store-assigned id.
    pub fn from_new(id: impl Into<String>, fields: NewProduct) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
        }
    }

    /// Replaces every field present in `patch`. The id is left untouched.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product::from_new(
            "abc",
            NewProduct {
                name: "Test Product".to_string(),
                description: Some("Test Description".to_string()),
                price: 100.0,
            },
        )
    }

    #[test]
    fn test_apply_partial_patch_keeps_other_fields() {
        let mut product = sample();
        product.apply(ProductPatch {
            price: Some(150.0),
            ..Default::default()
        });

        assert_eq!(product.id, "abc");
        assert_eq!(product.name, "Test Product");
        assert_eq!(product.description.as_deref(), Some("Test Description"));
        assert_eq!(product.price, 150.0);
    }

    #[test]
    fn test_apply_full_patch() {
        let mut product = sample();
        product.apply(ProductPatch {
            name: Some("Renamed".to_string()),
            description: Some("New".to_string()),
            price: Some(0.0),
        });

        assert_eq!(product.name, "Renamed");
        assert_eq!(product.description.as_deref(), Some("New"));
        assert_eq!(product.price, 0.0);
    }

    #[test]
    fn test_missing_description_deserializes_as_none() {
        let json = r#"{"id":"1","name":"Widget","price":2.5}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.description.is_none());
    }
}
