//! Closed attribute value type
//!
//! Decoded form of a single store attribute. The variant set mirrors the
//! wire tags one-to-one, so decoding is exhaustive.

use crate::number::Number;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Attribute name → decoded value for one row snapshot
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A decoded store attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// `NULL`
    Null,
    /// `BOOL`
    Bool(bool),
    /// `S`
    String(String),
    /// `N`, kept as validated text
    Number(Number),
    /// `B`, base64-decoded
    Binary(Vec<u8>),
    /// `L`
    List(Vec<AttributeValue>),
    /// `M`
    Map(Attributes),
    /// `SS`
    StringSet(Vec<String>),
    /// `NS`
    NumberSet(Vec<Number>),
    /// `BS`
    BinarySet(Vec<Vec<u8>>),
}

impl AttributeValue {
    /// Wire tag of this value
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::String(_) => "S",
            Self::Number(_) => "N",
            Self::Binary(_) => "B",
            Self::List(_) => "L",
            Self::Map(_) => "M",
            Self::StringSet(_) => "SS",
            Self::NumberSet(_) => "NS",
            Self::BinarySet(_) => "BS",
        }
    }

    /// Numeric payload, if this is a number
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// String payload, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is `NULL`
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Number> for AttributeValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<Decimal> for AttributeValue {
    fn from(value: Decimal) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// Serialized in wire form so normalized records can be dumped and re-read.
impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::wire::encode(self).serialize(serializer)
    }
}
