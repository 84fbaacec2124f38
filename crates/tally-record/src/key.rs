//! Composite row identity

use crate::error::DecodeError;
use crate::value::{AttributeValue, Attributes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition key attribute name
pub const PARTITION_KEY: &str = "pk";

/// Sort key attribute name
pub const SORT_KEY: &str = "sk";

/// `(pk, sk)` identity of a store row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    /// Partition key (e.g. `cart#<id>` or `user#<sub>`)
    pub partition_key: String,
    /// Sort key (e.g. `product#<id>`)
    pub sort_key: String,
}

impl ItemKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Extract the key from a decoded `Keys` map
    ///
    /// # Errors
    /// Returns [`DecodeError`] if `pk` or `sk` is absent or not a string.
    pub fn from_attributes(keys: &Attributes) -> Result<Self, DecodeError> {
        Ok(Self {
            partition_key: string_key(keys, PARTITION_KEY)?,
            sort_key: string_key(keys, SORT_KEY)?,
        })
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.partition_key, self.sort_key)
    }
}

fn string_key(keys: &Attributes, attribute: &'static str) -> Result<String, DecodeError> {
    match keys.get(attribute) {
        Some(AttributeValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(DecodeError::KeyNotString {
            attribute,
            found: other.type_name(),
        }),
        None => Err(DecodeError::MissingKeyAttribute(attribute)),
    }
}
