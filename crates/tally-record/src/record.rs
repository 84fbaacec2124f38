//! Normalized change records
//!
//! A [`ChangeRecord`] is built once per raw stream record, never mutated,
//! and dropped once its batch has been aggregated.

use crate::error::DecodeError;
use crate::key::ItemKey;
use crate::value::{AttributeValue, Attributes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Row created; only the after-snapshot exists
    Insert,
    /// Row updated; the after-snapshot exists, the before-snapshot usually does
    Modify,
    /// Row deleted; only the before-snapshot can exist
    Remove,
}

impl EventKind {
    /// Stream wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Modify => "MODIFY",
            Self::Remove => "REMOVE",
        }
    }

    /// Whether records of this kind may carry a before-snapshot
    #[inline]
    #[must_use]
    pub fn has_before(&self) -> bool {
        matches!(self, Self::Modify | Self::Remove)
    }

    /// Whether records of this kind must carry an after-snapshot
    #[inline]
    #[must_use]
    pub fn has_after(&self) -> bool {
        matches!(self, Self::Insert | Self::Modify)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(Self::Insert),
            "MODIFY" => Ok(Self::Modify),
            "REMOVE" => Ok(Self::Remove),
            other => Err(DecodeError::UnknownEventKind(other.to_string())),
        }
    }
}

/// Typed change record
///
/// # Invariants
/// - `before` is present only if `kind` is `Modify` or `Remove`; streams
///   that emit new images only leave it absent, and it then reads as zero
/// - `after` is present iff `kind` is `Insert` or `Modify`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    key: ItemKey,
    kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<Attributes>,
}

impl ChangeRecord {
    /// Build a record, checking snapshot presence against `kind`
    ///
    /// # Errors
    /// Returns [`DecodeError::MissingSnapshot`] when `kind` needs an
    /// after-snapshot and none is given. An absent before-snapshot is kept
    /// absent. Snapshots `kind` does not carry are dropped.
    pub fn new(
        key: ItemKey,
        kind: EventKind,
        before: Option<Attributes>,
        after: Option<Attributes>,
    ) -> Result<Self, DecodeError> {
        let before = if kind.has_before() { before } else { None };
        let after = match (kind.has_after(), after) {
            (true, None) => {
                return Err(DecodeError::MissingSnapshot {
                    kind,
                    snapshot: "NewImage",
                })
            }
            (true, Some(image)) => Some(image),
            (false, _) => None,
        };

        Ok(Self {
            key,
            kind,
            before,
            after,
        })
    }

    /// Insert record
    #[inline]
    #[must_use]
    pub fn insert(key: ItemKey, after: Attributes) -> Self {
        Self {
            key,
            kind: EventKind::Insert,
            before: None,
            after: Some(after),
        }
    }

    /// Modify record
    #[inline]
    #[must_use]
    pub fn modify(key: ItemKey, before: Attributes, after: Attributes) -> Self {
        Self {
            key,
            kind: EventKind::Modify,
            before: Some(before),
            after: Some(after),
        }
    }

    /// Remove record
    #[inline]
    #[must_use]
    pub fn remove(key: ItemKey, before: Attributes) -> Self {
        Self {
            key,
            kind: EventKind::Remove,
            before: Some(before),
            after: None,
        }
    }

    /// Row identity
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    /// Change kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Snapshot before the change
    #[inline]
    #[must_use]
    pub fn before(&self) -> Option<&Attributes> {
        self.before.as_ref()
    }

    /// Snapshot after the change
    #[inline]
    #[must_use]
    pub fn after(&self) -> Option<&Attributes> {
        self.after.as_ref()
    }

    /// Attribute from the before-snapshot
    #[inline]
    #[must_use]
    pub fn before_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.before.as_ref().and_then(|attrs| attrs.get(name))
    }

    /// Attribute from the after-snapshot
    #[inline]
    #[must_use]
    pub fn after_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.after.as_ref().and_then(|attrs| attrs.get(name))
    }
}
