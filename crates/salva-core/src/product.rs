//! Product catalog model and shelf slot resolution.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::highlight::ProductId;

/// Number of product slots drawn on the shop shelves.
pub const SHELF_SLOTS: u32 = 20;

/// A product as served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub price: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock_count: u32,
    /// Missing or empty URLs degrade to `None`; the UI shows a placeholder.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub image_url: Option<String>,
    /// Some stores hand metadata back as a JSON-encoded string, others as an
    /// object. Both are normalized to a JSON value here.
    #[serde(default, deserialize_with = "metadata_value")]
    pub metadata: Value,
}

impl Product {
    /// Looks up a string field in the metadata object.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn metadata_value<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_metadata(value))
}

/// Decodes string-encoded metadata. Strings that are not JSON are kept as-is.
pub fn normalize_metadata(value: Value) -> Value {
    match value {
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(decoded) => decoded,
            Err(_) => {
                tracing::warn!("[Product] metadata is not valid JSON, keeping raw string");
                Value::String(raw)
            }
        },
        other => other,
    }
}

/// Maps the fixed shelf slots (1..=20) to products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShelfLayout {
    slots: u32,
}

impl Default for ShelfLayout {
    fn default() -> Self {
        Self { slots: SHELF_SLOTS }
    }
}

impl ShelfLayout {
    pub fn slots(&self) -> impl Iterator<Item = u32> {
        1..=self.slots
    }

    /// Finds the product shown in `slot`.
    ///
    /// Products whose id equals the slot win; otherwise the product at
    /// position `slot - 1` is used.
    pub fn resolve<'a>(&self, slot: u32, products: &'a [Product]) -> Option<&'a Product> {
        if slot == 0 || slot > self.slots {
            tracing::warn!("[ShelfLayout] slot {} is outside the shelf", slot);
            return None;
        }

        let product = products
            .iter()
            .find(|p| p.id == slot)
            .or_else(|| products.get(slot as usize - 1));

        if product.is_none() {
            tracing::warn!("[ShelfLayout] Product not found for slot {}", slot);
        }
        product
    }
}
