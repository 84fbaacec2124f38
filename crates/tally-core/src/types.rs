//! Core types for batch handling

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Per-invocation identifier (ULID for sortability), used to correlate logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Ulid);

impl BatchId {
    /// Generate new batch ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Successful batch outcome
///
/// Upstream only sees `{"statusCode": 200}`; the counters are for logs and
/// callers in-process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    /// Always 200
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Invocation ID
    #[serde(skip)]
    pub batch_id: BatchId,
    /// Records delivered in the batch
    #[serde(skip)]
    pub records_seen: usize,
    /// Records that passed the product filter
    #[serde(skip)]
    pub records_eligible: usize,
    /// Additive writes issued (one per distinct product)
    #[serde(skip)]
    pub writes_issued: usize,
}

impl Acknowledgement {
    /// Status code reported for every successful batch
    pub const OK: u16 = 200;

    /// Create acknowledgement
    #[inline]
    #[must_use]
    pub fn new(
        batch_id: BatchId,
        records_seen: usize,
        records_eligible: usize,
        writes_issued: usize,
    ) -> Self {
        Self {
            status_code: Self::OK,
            batch_id,
            records_seen,
            records_eligible,
            writes_issued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_ids_are_unique() {
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn acknowledgement_serializes_status_only() {
        let ack = Acknowledgement::new(BatchId::new(), 3, 2, 1);
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json, serde_json::json!({ "statusCode": 200 }));
    }
}
