//! Batch handler
//!
//! One call per delivered batch:
//!
//! ```text
//! StreamEvent ─normalize─▶ [ChangeRecord] ─aggregate─▶ DeltaAccumulator ─fan-out─▶ CounterStore
//! ```
//!
//! Each call is self-contained: no state survives between batches, so
//! concurrent calls on one handler are safe. The store's atomic add is the
//! only point where concurrent batches meet.
//!
//! Redelivery is not deduplicated. A batch that failed after some writes
//! succeeded will re-apply those writes when delivered again.

use crate::config::HandlerConfig;
use crate::error::{BatchError, ConfigError};
use crate::fanout::WriteFanOut;
use crate::store::CounterStore;
use crate::types::{Acknowledgement, BatchId};
use std::fmt;
use std::sync::Arc;
use tally_aggregate::Aggregator;
use tally_record::{normalize, ChangeRecord, StreamEvent};
use tracing::Instrument;

/// Stream batch handler
pub struct BatchHandler {
    config: HandlerConfig,
    aggregator: Aggregator,
    fan_out: WriteFanOut,
}

impl BatchHandler {
    /// Create handler writing to `store`
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(config: HandlerConfig, store: Arc<dyn CounterStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            aggregator: Aggregator::new(config.aggregation.clone()),
            fan_out: WriteFanOut::new(store, &config),
            config,
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Process one delivered batch
    ///
    /// # Errors
    /// Returns [`BatchError`] if any record fails to decode, any eligible
    /// record has a non-numeric quantity, or any counter write fails after
    /// retries. The batch is reported as a whole; nothing about individual
    /// records is surfaced.
    pub async fn handle(&self, event: &StreamEvent) -> Result<Acknowledgement, BatchError> {
        let batch_id = BatchId::new();
        let span = tracing::info_span!("batch", %batch_id, records = event.len());

        async {
            let records = Self::normalize_all(event)?;
            self.process(batch_id, &records).await
        }
        .instrument(span)
        .await
    }

    /// Process a batch that is already normalized
    ///
    /// # Errors
    /// Same as [`BatchHandler::handle`], minus decode failures.
    pub async fn handle_records(
        &self,
        records: &[ChangeRecord],
    ) -> Result<Acknowledgement, BatchError> {
        let batch_id = BatchId::new();
        let span = tracing::info_span!("batch", %batch_id, records = records.len());

        self.process(batch_id, records).instrument(span).await
    }

    fn normalize_all(event: &StreamEvent) -> Result<Vec<ChangeRecord>, BatchError> {
        event
            .records
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                tracing::debug!(index, event_name = %raw.event_name, "current change event");
                normalize(raw).map_err(|source| {
                    tracing::error!(
                        index,
                        event_id = raw.event_id.as_deref().unwrap_or("-"),
                        error = %source,
                        "undecodable change record, failing batch"
                    );
                    BatchError::Decode { index, source }
                })
            })
            .collect()
    }

    async fn process(
        &self,
        batch_id: BatchId,
        records: &[ChangeRecord],
    ) -> Result<Acknowledgement, BatchError> {
        let deltas = self.aggregator.aggregate(records).map_err(|e| {
            tracing::error!(error = %e, "delta computation failed, failing batch");
            e
        })?;
        tracing::info!(
            eligible = deltas.contributions(),
            products = deltas.len(),
            "aggregated batch"
        );

        match self.fan_out.apply(&deltas).await {
            Ok(report) => {
                tracing::info!(
                    writes = report.writes_applied,
                    attempts = report.attempts,
                    "batch complete"
                );
                Ok(Acknowledgement::new(
                    batch_id,
                    records.len(),
                    deltas.contributions(),
                    report.writes_applied,
                ))
            }
            Err(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "batch failed");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for BatchHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchHandler")
            .field("config", &self.config)
            .field("fan_out", &self.fan_out)
            .finish_non_exhaustive()
    }
}
