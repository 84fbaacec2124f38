//! Delta computation errors

use tally_record::ItemKey;

/// Tracked attribute holds something other than a number
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("attribute '{attribute}' holds {found}, expected N")]
pub struct NotNumeric {
    /// Attribute name
    pub attribute: String,
    /// Wire tag of the value found
    pub found: &'static str,
}

/// Tracked attribute is a number beyond exact decimal arithmetic
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("attribute '{attribute}' holds {raw}, outside the supported quantity range")]
pub struct OutOfRange {
    /// Attribute name
    pub attribute: String,
    /// Number as received
    pub raw: String,
}

/// Why a tracked attribute could not be read as a quantity
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantityError {
    /// Not a number at all
    #[error(transparent)]
    NotNumeric(#[from] NotNumeric),
    /// A number, but too large or too precise
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
}

/// Failure to derive a delta from an eligible record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeltaError {
    /// A snapshot's tracked attribute is not numeric
    #[error("{snapshot} of {key}: {source}")]
    NotNumeric {
        /// Record key
        key: ItemKey,
        /// `OldImage` or `NewImage`
        snapshot: &'static str,
        /// Underlying cause
        #[source]
        source: NotNumeric,
    },

    /// A snapshot's tracked attribute cannot be represented exactly
    #[error("{snapshot} of {key}: {source}")]
    OutOfRange {
        /// Record key
        key: ItemKey,
        /// `OldImage` or `NewImage`
        snapshot: &'static str,
        /// Underlying cause
        #[source]
        source: OutOfRange,
    },

    /// A record delta or running sum left the exact decimal range
    #[error("quantity change for {key} overflows the supported range")]
    Overflow {
        /// Aggregation key
        key: String,
    },
}

impl DeltaError {
    pub(crate) fn in_snapshot(key: &ItemKey, snapshot: &'static str, error: QuantityError) -> Self {
        let key = key.clone();
        match error {
            QuantityError::NotNumeric(source) => Self::NotNumeric {
                key,
                snapshot,
                source,
            },
            QuantityError::OutOfRange(source) => Self::OutOfRange {
                key,
                snapshot,
                source,
            },
        }
    }
}
