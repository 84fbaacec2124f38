//! Write fan-out
//!
//! Turns a batch's net deltas into one additive write per product and
//! drives them concurrently. Writes have no ordering dependency on one
//! another; each is retried on its own. Every write runs to completion
//! before the batch outcome is decided.

use crate::config::HandlerConfig;
use crate::error::{BatchError, StoreWriteError, WriteFailure};
use crate::retry::RetryPolicy;
use crate::store::{AddRequest, CounterStore};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tally_aggregate::DeltaAccumulator;
use tally_record::ItemKey;

/// Outcome of a fully successful fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Writes applied (one per product)
    pub writes_applied: usize,
    /// Store calls made, including retries
    pub attempts: u32,
}

/// Issues per-product additive writes to the counter store
pub struct WriteFanOut {
    store: Arc<dyn CounterStore>,
    table: String,
    aggregate_sort_key: String,
    attribute: String,
    retry: RetryPolicy,
    max_concurrent: usize,
}

impl WriteFanOut {
    /// Create fan-out for `store` using the table, row and retry settings in `config`
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>, config: &HandlerConfig) -> Self {
        Self {
            store,
            table: config.table_name.clone(),
            aggregate_sort_key: config.aggregate_sort_key.clone(),
            attribute: config.aggregation.quantity_attribute.clone(),
            retry: config.retry,
            max_concurrent: config.max_concurrent_writes.max(1),
        }
    }

    /// Request adding `delta` to the total row of `product`
    #[must_use]
    pub fn request_for(&self, product: &str, delta: Decimal) -> AddRequest {
        AddRequest::new(
            self.table.clone(),
            ItemKey::new(product, self.aggregate_sort_key.clone()),
            self.attribute.clone(),
            delta,
        )
    }

    /// Apply every net delta, zero deltas included
    ///
    /// # Errors
    /// Returns [`BatchError::StoreWrite`] if any write exhausts its retries or
    /// is rejected. Writes that succeeded stay applied.
    pub async fn apply(&self, deltas: &DeltaAccumulator) -> Result<FanOutReport, BatchError> {
        let requests: Vec<AddRequest> = deltas
            .iter()
            .map(|(product, delta)| self.request_for(product, delta))
            .collect();

        let outcomes: Vec<(AddRequest, u32, Result<(), StoreWriteError>)> = stream::iter(requests)
            .map(|request| async move {
                let (attempts, result) = self
                    .retry
                    .run(&request.key.partition_key, || self.store.add(request.clone()))
                    .await;
                (request, attempts, result)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut report = FanOutReport::default();
        let mut failures = Vec::new();

        for (request, attempts, result) in outcomes {
            report.attempts += attempts;
            match result {
                Ok(()) => {
                    tracing::info!(
                        key = %request.key,
                        delta = %request.delta,
                        attempts,
                        "recorded change in quantity count"
                    );
                    report.writes_applied += 1;
                }
                Err(error) => {
                    tracing::error!(
                        key = %request.key,
                        delta = %request.delta,
                        attempts,
                        error = %error,
                        "counter write failed"
                    );
                    failures.push(WriteFailure {
                        key: request.key,
                        delta: request.delta,
                        attempts,
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            failures.sort_by(|a, b| a.key.cmp(&b.key));
            Err(BatchError::StoreWrite {
                succeeded: report.writes_applied,
                failures,
            })
        }
    }
}

impl fmt::Debug for WriteFanOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteFanOut")
            .field("table", &self.table)
            .field("aggregate_sort_key", &self.aggregate_sort_key)
            .field("attribute", &self.attribute)
            .field("retry", &self.retry)
            .field("max_concurrent", &self.max_concurrent)
            .finish_non_exhaustive()
    }
}
