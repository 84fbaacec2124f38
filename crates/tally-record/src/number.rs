//! Store numbers
//!
//! The store accepts up to 38 significant digits and magnitudes from 1e-130
//! to 1e126, which is wider than any fixed-size decimal. A [`Number`] keeps
//! the validated text as received, so every well-formed `N` decodes, and
//! converts to [`Decimal`] only where arithmetic is needed.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Decimal number in store text form
///
/// Equality is textual: `"2.50"` and `"2.5"` are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Validate `raw` as a decimal literal
    ///
    /// Accepts an optional sign, digits with at most one decimal point, and
    /// an optional exponent. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        is_decimal_literal(text).then(|| Self(text.to_string()))
    }

    /// Text as received
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact [`Decimal`] value, if it fits
    ///
    /// `None` when the value needs more than 28 significant digits or is
    /// beyond roughly ±7.9e28.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        if self.0.contains(['e', 'E']) {
            Decimal::from_scientific(&self.0).ok()
        } else {
            Decimal::from_str(&self.0).ok()
        }
    }
}

fn is_decimal_literal(text: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mantissa_ok = !(integer.is_empty() && fraction.is_empty())
        && all_digits(integer)
        && all_digits(fraction);
    let exponent_ok = exponent.map_or(true, |exponent| {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        !digits.is_empty() && all_digits(digits)
    });

    mantissa_ok && exponent_ok
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}
