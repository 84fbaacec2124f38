//! Property tests for intra-batch coalescing
//!
//! - Net delta per key equals the sum of its records' individual deltas.
//! - Record order inside a batch does not change the result.
//! - Ineligible records never reach the output.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tally_aggregate::{aggregate, record_delta};
use tally_record::ChangeRecord;
use tally_test_utils::{insert, modify, remove};

fn arb_record() -> impl Strategy<Value = ChangeRecord> {
    let cart = prop::sample::select(vec!["cart#a", "cart#b", "user#u"]);
    let sort_key = prop::sample::select(vec!["product#x", "product#y", "product#z", "metadata"]);
    (0u8..3, cart, sort_key, 0i64..1_000, 0i64..1_000).prop_map(
        |(kind, cart, sort_key, before, after)| match kind {
            0 => insert(cart, sort_key, after),
            1 => modify(cart, sort_key, before, after),
            _ => remove(cart, sort_key, before),
        },
    )
}

proptest! {
    #[test]
    fn net_delta_is_sum_of_record_deltas(records in prop::collection::vec(arb_record(), 0..40)) {
        let acc = aggregate(&records).unwrap();

        let mut expected: HashMap<String, Decimal> = HashMap::new();
        for record in records.iter().filter(|r| r.key().sort_key.starts_with("product#")) {
            *expected.entry(record.key().sort_key.clone()).or_default() +=
                record_delta(record, "quantity").unwrap();
        }

        prop_assert_eq!(acc.len(), expected.len());
        for (key, delta) in acc.iter() {
            prop_assert_eq!(Some(&delta), expected.get(key));
        }
    }

    #[test]
    fn order_does_not_matter(records in prop::collection::vec(arb_record(), 0..40)) {
        let forward = aggregate(&records).unwrap();
        let mut reversed_records = records.clone();
        reversed_records.reverse();
        let reversed = aggregate(&reversed_records).unwrap();

        prop_assert_eq!(forward.len(), reversed.len());
        for (key, delta) in forward.iter() {
            prop_assert_eq!(reversed.get(key), Some(delta));
        }
    }

    #[test]
    fn ineligible_keys_never_emitted(records in prop::collection::vec(arb_record(), 0..40)) {
        let acc = aggregate(&records).unwrap();
        prop_assert!(acc.iter().all(|(key, _)| key.starts_with("product#")));
    }
}

#[test]
fn end_to_end_scenario() {
    let batch = vec![
        insert("cartA", "product#X", 2),
        modify("cartB", "product#X", 1, 4),
    ];

    let acc = aggregate(&batch).unwrap();
    assert_eq!(acc.len(), 1);
    assert_eq!(acc.get("product#X"), Some(Decimal::from(5)));
}

#[test]
fn coalescing_plus_three_minus_one() {
    let batch = vec![
        modify("cart#a", "product#x", 5, 8),
        modify("cart#a", "product#x", 8, 7),
    ];

    let acc = aggregate(&batch).unwrap();
    assert_eq!(acc.len(), 1);
    assert_eq!(acc.get("product#x"), Some(Decimal::from(2)));
}

#[test]
fn zero_sum_is_still_emitted() {
    let batch = vec![
        insert("cart#a", "product#x", 4),
        remove("cart#b", "product#x", 4),
    ];

    let acc = aggregate(&batch).unwrap();
    assert_eq!(acc.get("product#x"), Some(Decimal::ZERO));
    assert_eq!(acc.into_entries().len(), 1);
}
