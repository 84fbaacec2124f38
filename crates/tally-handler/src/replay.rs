//! Offline replay of recorded stream events
//!
//! Runs a captured event payload through a [`BatchHandler`] backed by an
//! [`InMemoryCounterStore`], so the resulting counters can be inspected
//! without a live table.

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tally_core::{Acknowledgement, BatchError, BatchHandler, ConfigError, HandlerConfig, InMemoryCounterStore};
use tally_record::{normalize, ChangeRecord, DecodeError, Number, StreamEvent};

/// Replay failure
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Payload is not a stream event
    #[error("invalid event payload: {0}")]
    Payload(#[from] DecodeError),

    /// Handler could not be built
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Batch failed
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Result of a replayed batch
///
/// Serializes flat: the acknowledgement's `statusCode` and batch counts
/// followed by `counters`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// What the batch handler returned
    pub acknowledgement: Acknowledgement,
    /// Product → total after the batch
    pub counters: BTreeMap<String, Decimal>,
}

impl Serialize for ReplayOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ack = &self.acknowledgement;
        let mut state = serializer.serialize_struct("ReplayOutcome", 6)?;
        state.serialize_field("statusCode", &ack.status_code)?;
        state.serialize_field("batchId", &ack.batch_id.to_string())?;
        state.serialize_field("recordsSeen", &ack.records_seen)?;
        state.serialize_field("recordsEligible", &ack.records_eligible)?;
        state.serialize_field("writesIssued", &ack.writes_issued)?;
        state.serialize_field("counters", &self.counters)?;
        state.end()
    }
}

/// Replay a raw JSON event payload against an empty in-memory store
///
/// # Errors
/// Returns [`ReplayError`] if the payload does not parse, `config` is
/// invalid, or the batch fails.
pub async fn replay(payload: &str, config: HandlerConfig) -> Result<ReplayOutcome, ReplayError> {
    let event = StreamEvent::from_json(payload)?;
    replay_event(&event, config).await
}

/// Replay an already-parsed event against an empty in-memory store
///
/// # Errors
/// Returns [`ReplayError`] if `config` is invalid or the batch fails.
pub async fn replay_event(
    event: &StreamEvent,
    config: HandlerConfig,
) -> Result<ReplayOutcome, ReplayError> {
    let store = Arc::new(InMemoryCounterStore::new());
    let sort_key = config.aggregate_sort_key.clone();
    let attribute = config.aggregation.quantity_attribute.clone();

    let handler = BatchHandler::new(config, store.clone())?;
    let acknowledgement = handler.handle(event).await?;

    let counters = store
        .rows()
        .into_iter()
        .filter(|(key, _)| key.sort_key == sort_key)
        .filter_map(|(key, row)| {
            row.get(&attribute)
                .and_then(|value| value.as_number())
                .and_then(Number::to_decimal)
                .map(|total| (key.partition_key, total))
        })
        .collect();

    Ok(ReplayOutcome {
        acknowledgement,
        counters,
    })
}

/// Normalize every record of a raw JSON event payload
///
/// # Errors
/// Returns the first decode failure, with its record index folded into
/// [`BatchError::Decode`].
pub fn normalize_event(payload: &str) -> Result<Vec<ChangeRecord>, ReplayError> {
    let event = StreamEvent::from_json(payload)?;
    let records = event
        .records
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw).map_err(|source| BatchError::Decode { index, source }))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}
