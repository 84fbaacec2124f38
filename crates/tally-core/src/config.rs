//! Handler configuration

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use tally_aggregate::AggregationPolicy;

/// Sort key of the per-product total row
pub const DEFAULT_AGGREGATE_SORT_KEY: &str = "totalquantity";

/// Default bound on in-flight writes per batch
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 16;

/// Batch handler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Table holding both cart rows and counter rows
    pub table_name: String,
    /// Eligibility prefix and tracked attribute
    pub aggregation: AggregationPolicy,
    /// Sort key of the counter row each product's total lives in
    pub aggregate_sort_key: String,
    /// Per-key write retry
    pub retry: RetryPolicy,
    /// Maximum writes in flight at once within one batch
    pub max_concurrent_writes: usize,
}

impl HandlerConfig {
    /// Create configuration for `table_name` with defaults elsewhere
    #[inline]
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With write concurrency bound
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_writes(mut self, max: usize) -> Self {
        self.max_concurrent_writes = max;
        self
    }

    /// With aggregation policy
    #[inline]
    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationPolicy) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Check every field is usable
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::invalid("table_name", "must not be empty"));
        }
        if self.aggregation.product_prefix.is_empty() {
            return Err(ConfigError::invalid(
                "aggregation.product_prefix",
                "must not be empty",
            ));
        }
        if self.aggregation.quantity_attribute.is_empty() {
            return Err(ConfigError::invalid(
                "aggregation.quantity_attribute",
                "must not be empty",
            ));
        }
        if self.aggregate_sort_key.is_empty() {
            return Err(ConfigError::invalid("aggregate_sort_key", "must not be empty"));
        }
        // the counter row must never look like a product row, or its own
        // updates would feed back into the aggregation
        if self
            .aggregate_sort_key
            .starts_with(&self.aggregation.product_prefix)
        {
            return Err(ConfigError::invalid(
                "aggregate_sort_key",
                "must not start with the product prefix",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return Err(ConfigError::invalid(
                "retry.max_backoff_ms",
                "must not be below retry.initial_backoff_ms",
            ));
        }
        if self.max_concurrent_writes == 0 {
            return Err(ConfigError::invalid("max_concurrent_writes", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            aggregation: AggregationPolicy::default(),
            aggregate_sort_key: DEFAULT_AGGREGATE_SORT_KEY.to_string(),
            retry: RetryPolicy::default(),
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
        }
    }
}
