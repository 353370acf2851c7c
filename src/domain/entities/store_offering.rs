//! Denormalized offering returned by the public store search.

use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePrice {
    #[serde(default)]
    pub name: String,
    #[serde(with = "crate::domain::serde_utils::decimal_to_f64")]
    pub value: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCharacteristic {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSpecification {
    pub name: String,
    #[serde(default)]
    pub characteristics: Vec<StoreCharacteristic>,
}

/// Published offering as indexed by the store service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOffering {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sales_channels: Vec<String>,
    #[serde(default)]
    pub pricing: Vec<StorePrice>,
    #[serde(default)]
    pub specifications: Vec<StoreSpecification>,
}

impl StoreOffering {
    /// Cheapest plan attached to the offering.
    #[must_use]
    pub fn lowest_price(&self) -> Option<&StorePrice> {
        self.pricing
            .iter()
            .min_by(|a, b| a.value.total_cmp(&b.value))
    }

    /// Leading characteristics of the first specification, for compact display.
    #[must_use]
    pub fn top_characteristics(&self, limit: usize) -> &[StoreCharacteristic] {
        self.specifications
            .first()
            .map_or(&[][..], |spec| {
                &spec.characteristics[..spec.characteristics.len().min(limit)]
            })
    }
}

/// One page of `/store/search` results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub total: u64,
    #[serde(default)]
    pub items: Vec<StoreOffering>,
}
