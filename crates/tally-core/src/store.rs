//! Counter store seam
//!
//! The store owns every absolute value. This crate only ever asks it to
//! *add* a delta to a row attribute, which it applies atomically, so
//! concurrent batches touching the same product commute without locking.

use crate::error::StoreWriteError;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tally_record::{AttributeValue, Attributes, ItemKey, Number};

/// Value placeholder used in the update expression
const VALUE_PLACEHOLDER: &str = ":val";

/// One atomic additive update
///
/// Equivalent store call:
///
/// ```text
/// UpdateItem
///   Key                       = {pk: <product>, sk: "totalquantity"}
///   UpdateExpression          = "ADD #quantity :val"
///   ExpressionAttributeNames  = {"#quantity": "quantity"}
///   ExpressionAttributeValues = {":val": <delta>}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    /// Table holding the counters
    pub table: String,
    /// Counter row
    pub key: ItemKey,
    /// Attribute to add to
    pub attribute: String,
    /// Signed amount to add
    pub delta: Decimal,
}

impl AddRequest {
    /// Create request
    #[inline]
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        key: ItemKey,
        attribute: impl Into<String>,
        delta: Decimal,
    ) -> Self {
        Self {
            table: table.into(),
            key,
            attribute: attribute.into(),
            delta,
        }
    }

    fn name_placeholder(&self) -> String {
        format!("#{}", self.attribute)
    }

    /// `ADD #<attribute> :val`
    #[must_use]
    pub fn update_expression(&self) -> String {
        format!("ADD {} {VALUE_PLACEHOLDER}", self.name_placeholder())
    }

    /// Placeholder → attribute name
    #[must_use]
    pub fn expression_attribute_names(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(self.name_placeholder(), self.attribute.clone())])
    }

    /// Placeholder → delta
    #[must_use]
    pub fn expression_attribute_values(&self) -> BTreeMap<String, AttributeValue> {
        BTreeMap::from([(
            VALUE_PLACEHOLDER.to_string(),
            AttributeValue::from(self.delta),
        )])
    }
}

/// Downstream store of per-product counters
///
/// Implementations must apply [`AddRequest`]s atomically: never a
/// read-modify-write visible to other writers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add `request.delta` to `request.attribute` of `request.key`
    ///
    /// An absent row or attribute counts as zero.
    async fn add(&self, request: AddRequest) -> Result<(), StoreWriteError>;
}

/// In-process counter store
///
/// Rows live in a [`DashMap`]; each add holds the row's shard lock for the
/// duration of the update, so concurrent adds to one row serialize.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    rows: DashMap<ItemKey, Attributes>,
    writes: AtomicUsize,
}

impl InMemoryCounterStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a row wholesale
    pub fn put_row(&self, key: ItemKey, attributes: Attributes) {
        self.rows.insert(key, attributes);
    }

    /// Numeric value of `attribute` on `key`, if present and representable
    #[must_use]
    pub fn value(&self, key: &ItemKey, attribute: &str) -> Option<Decimal> {
        self.rows.get(key).and_then(|row| {
            row.get(attribute)
                .and_then(AttributeValue::as_number)
                .and_then(Number::to_decimal)
        })
    }

    /// Copy of every row, ordered by key
    #[must_use]
    pub fn rows(&self) -> BTreeMap<ItemKey, Attributes> {
        self.rows
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of adds applied
    #[inline]
    #[must_use]
    pub fn writes_applied(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn add(&self, request: AddRequest) -> Result<(), StoreWriteError> {
        let mut row = self.rows.entry(request.key.clone()).or_default();

        let current = match row.get(&request.attribute) {
            None => Decimal::ZERO,
            Some(AttributeValue::Number(n)) => n.to_decimal().ok_or_else(|| {
                StoreWriteError::Rejected(format!(
                    "value {n} of '{}' on {} is outside the supported range",
                    request.attribute, request.key
                ))
            })?,
            Some(other) => {
                return Err(StoreWriteError::Rejected(format!(
                    "cannot ADD to {} attribute '{}' of {}",
                    other.type_name(),
                    request.attribute,
                    request.key
                )))
            }
        };
        let updated = current.checked_add(request.delta).ok_or_else(|| {
            StoreWriteError::Rejected(format!("numeric overflow on {}", request.key))
        })?;

        row.insert(request.attribute, AttributeValue::from(updated));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
