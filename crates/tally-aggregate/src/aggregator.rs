//! Batch aggregation
//!
//! Filter → delta → coalesce, in arrival order, over one batch of records.

use crate::accumulator::DeltaAccumulator;
use crate::delta::record_delta;
use crate::error::DeltaError;
use crate::policy::AggregationPolicy;
use tally_record::ChangeRecord;

/// Batch aggregator
///
/// Stateless between calls: every [`Aggregator::aggregate`] starts from an
/// empty [`DeltaAccumulator`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    policy: AggregationPolicy,
}

impl Aggregator {
    /// Create aggregator with policy
    #[inline]
    #[must_use]
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &AggregationPolicy {
        &self.policy
    }

    /// Aggregate one batch into net deltas keyed by product sort key
    ///
    /// Records whose sort key fails the product predicate are skipped
    /// silently. The partition key never participates in the aggregation
    /// key, so the same product seen in different carts collapses into one
    /// entry.
    ///
    /// # Errors
    /// Returns [`DeltaError`] if an eligible record's tracked attribute is
    /// not a usable number, or a product's net delta overflows.
    pub fn aggregate(&self, records: &[ChangeRecord]) -> Result<DeltaAccumulator, DeltaError> {
        let mut acc = DeltaAccumulator::new();

        for record in records {
            if !self.policy.is_eligible(record.key()) {
                tracing::trace!(key = %record.key(), "skipping non-product record");
                continue;
            }

            let delta = record_delta(record, &self.policy.quantity_attribute)?;
            tracing::debug!(
                kind = %record.kind(),
                key = %record.key(),
                %delta,
                "recording quantity change"
            );
            acc.add(record.key().sort_key.clone(), delta)?;
        }

        Ok(acc)
    }
}

/// Aggregate with the default product/quantity policy
///
/// # Errors
/// See [`Aggregator::aggregate`].
pub fn aggregate(records: &[ChangeRecord]) -> Result<DeltaAccumulator, DeltaError> {
    Aggregator::default().aggregate(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tally_record::{AttributeValue, Attributes, ItemKey};
    use tally_test_utils::{insert, modify, remove};

    #[test]
    fn empty_batch() {
        let acc = aggregate(&[]).unwrap();
        assert!(acc.is_empty());
    }

    #[test]
    fn insert_yields_positive_delta() {
        let acc = aggregate(&[insert("cart#a", "product#x", 2)]).unwrap();
        assert_eq!(acc.get("product#x"), Some(Decimal::from(2)));
    }

    #[test]
    fn remove_yields_negative_delta() {
        let acc = aggregate(&[remove("cart#a", "product#x", 6)]).unwrap();
        assert_eq!(acc.get("product#x"), Some(Decimal::from(-6)));
    }

    #[test]
    fn modify_yields_difference() {
        let acc = aggregate(&[modify("cart#a", "product#x", 5, 8)]).unwrap();
        assert_eq!(acc.get("product#x"), Some(Decimal::from(3)));

        let acc = aggregate(&[modify("cart#a", "product#x", 8, 5)]).unwrap();
        assert_eq!(acc.get("product#x"), Some(Decimal::from(-3)));
    }

    #[test]
    fn ineligible_records_contribute_nothing() {
        let acc = aggregate(&[
            insert("cart#a", "metadata", 100),
            insert("product#x", "totalquantity", 100),
        ])
        .unwrap();
        assert!(acc.is_empty());
        assert_eq!(acc.contributions(), 0);
    }

    #[test]
    fn cross_partition_collapse() {
        let acc = aggregate(&[
            insert("cart#a", "product#x", 1),
            insert("user#u", "product#x", 2),
        ])
        .unwrap();
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get("product#x"), Some(Decimal::from(3)));
    }

    #[test]
    fn custom_attribute_policy() {
        let aggregator = Aggregator::new(AggregationPolicy::new("product#", "reserved"));
        // fixtures only populate `quantity`, so `reserved` reads as zero everywhere
        let acc = aggregator
            .aggregate(&[insert("cart#a", "product#x", 9)])
            .unwrap();
        assert_eq!(acc.get("product#x"), Some(Decimal::ZERO));
    }

    #[test]
    fn overflowing_net_delta_fails_instead_of_panicking() {
        let huge = Attributes::from([(
            "quantity".to_string(),
            AttributeValue::from(Decimal::from_str_exact("50000000000000000000000000000").unwrap()),
        )]);
        let record = ChangeRecord::insert(ItemKey::new("cart#a", "product#x"), huge);

        let err = aggregate(&[record.clone(), record]).unwrap_err();
        assert!(matches!(err, DeltaError::Overflow { key } if key == "product#x"));
    }
}
