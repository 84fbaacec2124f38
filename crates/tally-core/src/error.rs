//! Error types for Tally Core
//!
//! Provides the batch-level failure taxonomy:
//! - Decode failures (stream shape not understood, fatal)
//! - Delta failures (tracked attribute not numeric, fatal)
//! - Store write failures (retried per key, then fail the whole batch)
//! - Configuration errors

use rust_decimal::Decimal;
use tally_aggregate::DeltaError;
use tally_record::{DecodeError, ItemKey};

/// Batch invocation failure
///
/// Every variant aborts the batch; there is no partial-success reporting.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// A raw record could not be normalized
    #[error("record {index} could not be decoded: {source}")]
    Decode {
        /// Position of the record in the batch
        index: usize,
        /// Underlying cause
        #[source]
        source: DecodeError,
    },

    /// An eligible record carried a non-numeric tracked attribute
    #[error("delta computation failed: {0}")]
    Delta(#[from] DeltaError),

    /// One or more per-key writes exhausted their retries
    #[error("{} of {} counter writes failed", .failures.len(), .failures.len() + .succeeded)]
    StoreWrite {
        /// Writes that were applied before the batch was failed
        succeeded: usize,
        /// Writes that were not applied
        failures: Vec<WriteFailure>,
    },
}

impl BatchError {
    /// Whether redelivering the batch can succeed
    ///
    /// Decode and delta failures repeat on every delivery. Store failures
    /// are retryable only if none was a permanent rejection. Note that
    /// redelivery re-applies the writes counted in `succeeded`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Decode { .. } | Self::Delta(_) => false,
            Self::StoreWrite { failures, .. } => {
                failures.iter().all(|failure| failure.error.is_retryable())
            }
        }
    }
}

/// A per-key write that could not be applied
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFailure {
    /// Counter row the write targeted
    pub key: ItemKey,
    /// Net delta that was not applied
    pub delta: Decimal,
    /// Attempts made
    pub attempts: u32,
    /// Last error returned by the store
    pub error: StoreWriteError,
}

/// Counter store write failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreWriteError {
    /// Network, throttling or other condition expected to clear
    #[error("transient store failure: {0}")]
    Transient(String),

    /// Store refused the write; retrying will not help
    #[error("store rejected write: {0}")]
    Rejected(String),
}

impl StoreWriteError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Invalid handler configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Field value is unusable
    #[error("invalid configuration: {field} {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl ConfigError {
    /// Create invalid-field error
    #[inline]
    #[must_use]
    pub fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_aggregate::NotNumeric;

    fn failure(error: StoreWriteError) -> WriteFailure {
        WriteFailure {
            key: ItemKey::new("product#x", "totalquantity"),
            delta: Decimal::ONE,
            attempts: 3,
            error,
        }
    }

    #[test]
    fn store_write_error_is_retryable() {
        assert!(StoreWriteError::Transient("throttled".into()).is_retryable());
        assert!(!StoreWriteError::Rejected("validation".into()).is_retryable());
    }

    #[test]
    fn decode_failures_are_non_retryable() {
        let err = BatchError::Decode {
            index: 0,
            source: DecodeError::UnknownEventKind("TRUNCATE".into()),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("record 0"));
    }

    #[test]
    fn delta_failures_are_non_retryable() {
        let err = BatchError::from(DeltaError::NotNumeric {
            key: ItemKey::new("cart#a", "product#x"),
            snapshot: "NewImage",
            source: NotNumeric {
                attribute: "quantity".into(),
                found: "S",
            },
        });
        assert!(!err.is_retryable());
    }

    #[test]
    fn exhausted_transient_writes_are_retryable() {
        let err = BatchError::StoreWrite {
            succeeded: 2,
            failures: vec![failure(StoreWriteError::Transient("timeout".into()))],
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "1 of 3 counter writes failed");
    }

    #[test]
    fn any_rejection_makes_batch_non_retryable() {
        let err = BatchError::StoreWrite {
            succeeded: 0,
            failures: vec![
                failure(StoreWriteError::Transient("timeout".into())),
                failure(StoreWriteError::Rejected("bad type".into())),
            ],
        };
        assert!(!err.is_retryable());
    }
}
