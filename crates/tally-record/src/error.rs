//! Decode errors for the record layer
//!
//! Every variant is fatal for the batch that carried the offending record:
//! it means the stream holds a shape this crate does not understand.

use crate::record::EventKind;

/// Failure to turn a raw change notification into a [`crate::ChangeRecord`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Type tag outside the closed set understood by the decoder
    #[error("unknown type tag '{tag}' at {path}")]
    UnknownTypeTag {
        /// Attribute path of the value
        path: String,
        /// The offending tag
        tag: String,
    },

    /// Value is not a single-tag object or its payload has the wrong JSON type
    #[error("malformed value at {path}: {reason}")]
    MalformedValue {
        /// Attribute path of the value
        path: String,
        /// What was wrong
        reason: String,
    },

    /// `N` payload that is not a decimal number
    #[error("invalid number '{raw}' at {path}")]
    InvalidNumber {
        /// Attribute path of the value
        path: String,
        /// Raw string payload
        raw: String,
    },

    /// `B` payload that is not valid base64
    #[error("invalid binary at {path}: {reason}")]
    InvalidBinary {
        /// Attribute path of the value
        path: String,
        /// Decoder message
        reason: String,
    },

    /// Event name outside `INSERT | MODIFY | REMOVE`
    #[error("unknown event kind: '{0}'")]
    UnknownEventKind(String),

    /// Key attribute absent from the record's key map
    #[error("missing key attribute: {0}")]
    MissingKeyAttribute(&'static str),

    /// Key attribute present but not a string
    #[error("key attribute {attribute} must be a string, got {found}")]
    KeyNotString {
        /// `pk` or `sk`
        attribute: &'static str,
        /// Type name actually found
        found: &'static str,
    },

    /// New image absent on an `INSERT` or `MODIFY`
    #[error("{kind} record is missing its {snapshot} snapshot")]
    MissingSnapshot {
        /// Event kind of the record
        kind: EventKind,
        /// Name of the absent snapshot
        snapshot: &'static str,
    },

    /// Whole-event payload is not valid JSON for the stream event shape
    #[error("invalid stream event: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Create malformed-value error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let err = DecodeError::UnknownTypeTag {
            path: "NewImage.quantity".to_string(),
            tag: "X".to_string(),
        };
        assert_eq!(err.to_string(), "unknown type tag 'X' at NewImage.quantity");
    }

    #[test]
    fn missing_snapshot_display() {
        let err = DecodeError::MissingSnapshot {
            kind: EventKind::Modify,
            snapshot: "NewImage",
        };
        assert!(err.to_string().contains("MODIFY"));
        assert!(err.to_string().contains("NewImage"));
    }
}
