//! Testing utilities for the Tally workspace
//!
//! Shared fixtures (wire-encoded raw records, normalized records) and a
//! failure-injecting counter store.

#![allow(missing_docs)]

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use tally_core::{AddRequest, CounterStore, InMemoryCounterStore, StoreWriteError};
use tally_record::{AttributeValue, Attributes, ChangeRecord, ItemKey, RawChange, RawRecord, StreamEvent};

pub fn quantity_image(quantity: i64) -> Attributes {
    Attributes::from([("quantity".to_string(), AttributeValue::from(quantity))])
}

pub fn insert(pk: &str, sk: &str, quantity: i64) -> ChangeRecord {
    ChangeRecord::insert(ItemKey::new(pk, sk), quantity_image(quantity))
}

pub fn modify(pk: &str, sk: &str, before: i64, after: i64) -> ChangeRecord {
    ChangeRecord::modify(ItemKey::new(pk, sk), quantity_image(before), quantity_image(after))
}

pub fn remove(pk: &str, sk: &str, quantity: i64) -> ChangeRecord {
    ChangeRecord::remove(ItemKey::new(pk, sk), quantity_image(quantity))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture image must be a JSON object, got {other}"),
    }
}

fn wire_quantity(quantity: i64) -> Value {
    json!({
        "quantity": { "N": quantity.to_string() },
        "productDetail": { "M": { "name": { "S": "fixture" } } }
    })
}

pub fn raw_record(
    event_name: &str,
    pk: &str,
    sk: &str,
    old_image: Option<Value>,
    new_image: Option<Value>,
) -> RawRecord {
    RawRecord {
        event_id: None,
        event_name: event_name.to_string(),
        change: RawChange {
            keys: object(json!({ "pk": { "S": pk }, "sk": { "S": sk } })),
            new_image: new_image.map(object),
            old_image: old_image.map(object),
            sequence_number: None,
        },
    }
}

pub fn raw_insert(pk: &str, sk: &str, quantity: i64) -> RawRecord {
    raw_record("INSERT", pk, sk, None, Some(wire_quantity(quantity)))
}

pub fn raw_modify(pk: &str, sk: &str, before: i64, after: i64) -> RawRecord {
    raw_record(
        "MODIFY",
        pk,
        sk,
        Some(wire_quantity(before)),
        Some(wire_quantity(after)),
    )
}

pub fn raw_remove(pk: &str, sk: &str, quantity: i64) -> RawRecord {
    raw_record("REMOVE", pk, sk, Some(wire_quantity(quantity)), None)
}

/// Number records with `eventID`s so failures are traceable in logs
pub fn stream_event(records: Vec<RawRecord>) -> StreamEvent {
    StreamEvent {
        records: records
            .into_iter()
            .enumerate()
            .map(|(i, mut record)| {
                record.event_id = Some(format!("fixture-{i}"));
                record
            })
            .collect(),
    }
}

pub fn counter_key(product: &str) -> ItemKey {
    ItemKey::new(product, "totalquantity")
}

#[derive(Debug, Clone)]
enum Fault {
    /// Fail transiently this many more times, then succeed
    Transient(usize),
    /// Reject every write
    Reject,
}

/// In-memory counter store with per-product failure injection
#[derive(Debug, Default)]
pub struct FlakyCounterStore {
    inner: InMemoryCounterStore,
    faults: DashMap<String, Fault>,
    calls: AtomicUsize,
}

impl FlakyCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next `times` writes to `product` fail transiently
    pub fn fail_transiently(&self, product: &str, times: usize) {
        self.faults.insert(product.to_string(), Fault::Transient(times));
    }

    /// Every write to `product` is rejected until [`FlakyCounterStore::heal`]
    pub fn reject(&self, product: &str) {
        self.faults.insert(product.to_string(), Fault::Reject);
    }

    /// Clear all injected faults
    pub fn heal(&self) {
        self.faults.clear();
    }

    pub fn total(&self, product: &str) -> Option<Decimal> {
        self.inner.value(&counter_key(product), "quantity")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes_applied(&self) -> usize {
        self.inner.writes_applied()
    }
}

#[async_trait]
impl CounterStore for FlakyCounterStore {
    async fn add(&self, request: AddRequest) -> Result<(), StoreWriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(mut fault) = self.faults.get_mut(&request.key.partition_key) {
            match &mut *fault {
                Fault::Reject => {
                    return Err(StoreWriteError::Rejected(format!(
                        "injected rejection for {}",
                        request.key
                    )))
                }
                Fault::Transient(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    return Err(StoreWriteError::Transient(format!(
                        "injected timeout for {}",
                        request.key
                    )));
                }
                Fault::Transient(_) => {}
            }
        }

        self.inner.add(request).await
    }
}
