//! Eligibility and tracked-attribute policy

use serde::{Deserialize, Serialize};
use tally_record::ItemKey;

/// Sort-key marker of product rows
pub const DEFAULT_PRODUCT_PREFIX: &str = "product#";

/// Attribute whose changes are counted
pub const DEFAULT_QUANTITY_ATTRIBUTE: &str = "quantity";

/// What the aggregator counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationPolicy {
    /// Sort-key prefix a row must carry to be counted
    pub product_prefix: String,
    /// Numeric attribute diffed between snapshots
    pub quantity_attribute: String,
}

impl AggregationPolicy {
    /// Create policy
    #[inline]
    #[must_use]
    pub fn new(product_prefix: impl Into<String>, quantity_attribute: impl Into<String>) -> Self {
        Self {
            product_prefix: product_prefix.into(),
            quantity_attribute: quantity_attribute.into(),
        }
    }

    /// Whether a row is a product entity
    ///
    /// Only the sort key is consulted; the partition key (cart or user) is irrelevant.
    #[inline]
    #[must_use]
    pub fn is_eligible(&self, key: &ItemKey) -> bool {
        key.sort_key.starts_with(&self.product_prefix)
    }
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_PREFIX, DEFAULT_QUANTITY_ATTRIBUTE)
    }
}
