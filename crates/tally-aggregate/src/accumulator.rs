//! Per-batch delta accumulator

use crate::error::DeltaError;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

/// One coalesced entry: aggregation key and its net delta
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetDelta {
    /// Aggregation key (the product sort key)
    pub key: String,
    /// Sum of every contribution for `key` in the batch
    pub delta: Decimal,
}

/// Running signed sum per aggregation key, scoped to one batch
///
/// # Invariants
/// - Each key appears at most once
/// - A key's value is the sum of every delta added for it
/// - Zero sums are kept, never pruned
///
/// Keys iterate in first-seen order so emitted writes are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaAccumulator {
    sums: IndexMap<String, Decimal>,
    contributions: usize,
}

impl DeltaAccumulator {
    /// Create empty accumulator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delta under `key`
    ///
    /// # Errors
    /// Returns [`DeltaError::Overflow`] if the running sum for `key` would
    /// leave the [`Decimal`] range; the accumulator is left unchanged.
    pub fn add(&mut self, key: impl Into<String>, delta: Decimal) -> Result<(), DeltaError> {
        let key = key.into();
        let current = self.sums.get(&key).copied().unwrap_or(Decimal::ZERO);
        let Some(sum) = current.checked_add(delta) else {
            return Err(DeltaError::Overflow { key });
        };

        self.sums.insert(key, sum);
        self.contributions += 1;
        Ok(())
    }

    /// Net delta for `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.sums.get(key).copied()
    }

    /// Number of distinct keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Whether nothing was added
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Number of deltas added (eligible records seen)
    #[inline]
    #[must_use]
    pub fn contributions(&self) -> usize {
        self.contributions
    }

    /// Iterate `(key, net delta)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.sums.iter().map(|(key, delta)| (key.as_str(), *delta))
    }

    /// Sum over all keys, `None` on overflow
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        self.sums
            .values()
            .try_fold(Decimal::ZERO, |total, delta| total.checked_add(*delta))
    }

    /// Consume into coalesced entries
    #[must_use]
    pub fn into_entries(self) -> Vec<NetDelta> {
        self.sums
            .into_iter()
            .map(|(key, delta)| NetDelta { key, delta })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_same_key() {
        let mut acc = DeltaAccumulator::new();
        acc.add("product#x", Decimal::from(3)).unwrap();
        acc.add("product#x", Decimal::from(-1)).unwrap();

        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get("product#x"), Some(Decimal::from(2)));
        assert_eq!(acc.contributions(), 2);
    }

    #[test]
    fn keeps_zero_sums() {
        let mut acc = DeltaAccumulator::new();
        acc.add("product#x", Decimal::from(4)).unwrap();
        acc.add("product#x", Decimal::from(-4)).unwrap();

        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get("product#x"), Some(Decimal::ZERO));
    }

    #[test]
    fn first_seen_order() {
        let mut acc = DeltaAccumulator::new();
        acc.add("product#b", Decimal::ONE).unwrap();
        acc.add("product#a", Decimal::ONE).unwrap();
        acc.add("product#b", Decimal::ONE).unwrap();

        let keys: Vec<_> = acc.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["product#b", "product#a"]);
        assert_eq!(acc.total(), Some(Decimal::from(3)));
    }

    #[test]
    fn into_entries() {
        let mut acc = DeltaAccumulator::new();
        acc.add("product#a", Decimal::from(5)).unwrap();

        assert_eq!(
            acc.into_entries(),
            vec![NetDelta {
                key: "product#a".to_string(),
                delta: Decimal::from(5)
            }]
        );
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        let half = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let mut acc = DeltaAccumulator::new();
        acc.add("product#x", half).unwrap();

        let err = acc.add("product#x", half).unwrap_err();
        assert_eq!(
            err,
            DeltaError::Overflow {
                key: "product#x".to_string()
            }
        );
        assert_eq!(acc.get("product#x"), Some(half));
        assert_eq!(acc.contributions(), 1);
    }
}
