//! Per-record delta
//!
//! The store emits full snapshots, not deltas. A record's contribution is
//! `after - before` for the tracked attribute, where an absent snapshot or
//! absent attribute reads as zero. That single rule covers all three kinds:
//!
//! | Kind   | before | after | delta            |
//! |--------|--------|-------|------------------|
//! | Insert | 0      | Q     | `+Q`             |
//! | Modify | B      | A     | `A - B`          |
//! | Remove | Q      | 0     | `-Q`             |
//!
//! A `Modify` or `Remove` whose old image was not emitted reads `before` as
//! zero as well.
//!
//! Arithmetic is exact and checked: a quantity that does not fit a
//! [`Decimal`], or a difference that overflows one, is an error.

use crate::error::{DeltaError, NotNumeric, OutOfRange, QuantityError};
use rust_decimal::Decimal;
use tally_record::{AttributeValue, Attributes, ChangeRecord};

/// Numeric value of `name` in `attrs`, or zero when either is absent
///
/// # Errors
/// Returns [`QuantityError::NotNumeric`] if the attribute exists but is not
/// a number (including `NULL`), and [`QuantityError::OutOfRange`] if it is
/// a number that does not fit a [`Decimal`].
pub fn numeric_or_zero(attrs: Option<&Attributes>, name: &str) -> Result<Decimal, QuantityError> {
    match attrs.and_then(|attrs| attrs.get(name)) {
        None => Ok(Decimal::ZERO),
        Some(AttributeValue::Number(n)) => n.to_decimal().ok_or_else(|| {
            QuantityError::from(OutOfRange {
                attribute: name.to_string(),
                raw: n.to_string(),
            })
        }),
        Some(other) => Err(NotNumeric {
            attribute: name.to_string(),
            found: other.type_name(),
        }
        .into()),
    }
}

/// Signed change of `attribute` carried by one record
///
/// # Errors
/// Returns [`DeltaError::NotNumeric`] or [`DeltaError::OutOfRange`] naming
/// the record and snapshot whose attribute is unusable, and
/// [`DeltaError::Overflow`] if the difference does not fit a [`Decimal`].
pub fn record_delta(record: &ChangeRecord, attribute: &str) -> Result<Decimal, DeltaError> {
    let after = numeric_or_zero(record.after(), attribute)
        .map_err(|e| DeltaError::in_snapshot(record.key(), "NewImage", e))?;
    let before = numeric_or_zero(record.before(), attribute)
        .map_err(|e| DeltaError::in_snapshot(record.key(), "OldImage", e))?;

    after
        .checked_sub(before)
        .ok_or_else(|| DeltaError::Overflow {
            key: record.key().sort_key.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_record::{ItemKey, Number};

    fn image(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    fn quantity(q: i64) -> Attributes {
        image(&[("quantity", AttributeValue::from(q))])
    }

    fn key() -> ItemKey {
        ItemKey::new("cart#a", "product#x")
    }

    #[test]
    fn absent_snapshot_is_zero() {
        assert_eq!(numeric_or_zero(None, "quantity").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn absent_attribute_is_zero() {
        let attrs = image(&[("productDetail", AttributeValue::from("widget"))]);
        assert_eq!(numeric_or_zero(Some(&attrs), "quantity").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn present_number_is_returned() {
        assert_eq!(
            numeric_or_zero(Some(&quantity(7)), "quantity").unwrap(),
            Decimal::from(7)
        );
    }

    #[test]
    fn non_numeric_is_an_error() {
        let attrs = image(&[("quantity", AttributeValue::from("7"))]);
        let err = numeric_or_zero(Some(&attrs), "quantity").unwrap_err();
        assert!(matches!(err, QuantityError::NotNumeric(NotNumeric { found: "S", .. })));

        let attrs = image(&[("quantity", AttributeValue::Null)]);
        assert!(numeric_or_zero(Some(&attrs), "quantity").is_err());
    }

    #[test]
    fn insert_delta_is_inserted_quantity() {
        let record = ChangeRecord::insert(key(), quantity(3));
        assert_eq!(record_delta(&record, "quantity").unwrap(), Decimal::from(3));
    }

    #[test]
    fn remove_delta_is_negated_quantity() {
        let record = ChangeRecord::remove(key(), quantity(3));
        assert_eq!(record_delta(&record, "quantity").unwrap(), Decimal::from(-3));
    }

    #[test]
    fn modify_delta_is_difference() {
        let up = ChangeRecord::modify(key(), quantity(5), quantity(8));
        assert_eq!(record_delta(&up, "quantity").unwrap(), Decimal::from(3));

        let down = ChangeRecord::modify(key(), quantity(8), quantity(5));
        assert_eq!(record_delta(&down, "quantity").unwrap(), Decimal::from(-3));
    }

    #[test]
    fn modify_that_adds_the_attribute() {
        let record = ChangeRecord::modify(key(), image(&[]), quantity(4));
        assert_eq!(record_delta(&record, "quantity").unwrap(), Decimal::from(4));
    }

    #[test]
    fn fractional_quantities_are_exact() {
        let before = image(&[("quantity", AttributeValue::from(Decimal::new(1, 1)))]);
        let after = image(&[("quantity", AttributeValue::from(Decimal::new(3, 1)))]);
        let record = ChangeRecord::modify(key(), before, after);
        assert_eq!(record_delta(&record, "quantity").unwrap(), Decimal::new(2, 1));
    }

    #[test]
    fn error_names_snapshot() {
        let bad = image(&[("quantity", AttributeValue::Bool(true))]);
        let record = ChangeRecord::modify(key(), bad, quantity(1));
        let err = record_delta(&record, "quantity").unwrap_err();
        assert!(matches!(err, DeltaError::NotNumeric { snapshot: "OldImage", .. }));
    }

    fn raw_quantity(raw: &str) -> Attributes {
        image(&[("quantity", AttributeValue::Number(Number::parse(raw).unwrap()))])
    }

    #[test]
    fn missing_old_image_reads_as_zero() {
        let modify = ChangeRecord::new(
            key(),
            tally_record::EventKind::Modify,
            None,
            Some(quantity(4)),
        )
        .unwrap();
        assert_eq!(record_delta(&modify, "quantity").unwrap(), Decimal::from(4));

        let remove =
            ChangeRecord::new(key(), tally_record::EventKind::Remove, None, None).unwrap();
        assert_eq!(record_delta(&remove, "quantity").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn quantity_beyond_decimal_range_is_an_error() {
        let record = ChangeRecord::insert(key(), raw_quantity("1E+30"));
        let err = record_delta(&record, "quantity").unwrap_err();
        assert!(matches!(err, DeltaError::OutOfRange { snapshot: "NewImage", .. }));
    }

    #[test]
    fn overflowing_difference_is_an_error() {
        let record = ChangeRecord::modify(
            key(),
            raw_quantity("-50000000000000000000000000000"),
            raw_quantity("50000000000000000000000000000"),
        );
        let err = record_delta(&record, "quantity").unwrap_err();
        assert_eq!(
            err,
            DeltaError::Overflow {
                key: "product#x".to_string()
            }
        );
    }
}
