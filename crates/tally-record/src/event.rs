//! Raw stream event shape
//!
//! Mirrors the JSON the change stream delivers to a batch invocation.
//! Fields the handler does not read are ignored.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One delivered batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Records in arrival order
    #[serde(rename = "Records", default)]
    pub records: Vec<RawRecord>,
}

impl StreamEvent {
    /// Parse a batch from its JSON payload
    ///
    /// # Errors
    /// Returns [`DecodeError::Json`] if the payload is not a stream event.
    pub fn from_json(payload: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Number of records in the batch
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One raw change notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Delivery-assigned record id
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// `INSERT`, `MODIFY` or `REMOVE`
    #[serde(default)]
    pub event_name: String,
    /// Store payload
    #[serde(rename = "dynamodb", default)]
    pub change: RawChange,
}

/// Store payload of a raw change notification, still wire-encoded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawChange {
    /// Key attributes
    #[serde(default)]
    pub keys: Map<String, Value>,
    /// Row after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Map<String, Value>>,
    /// Row before the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<Map<String, Value>>,
    /// Position within the shard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}
