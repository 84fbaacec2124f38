//! Raw stream record → [`ChangeRecord`]

use crate::error::DecodeError;
use crate::event::RawRecord;
use crate::key::ItemKey;
use crate::record::{ChangeRecord, EventKind};
use crate::wire;

/// Normalize one raw change notification
///
/// Decodes the key and the snapshots the event kind carries. Any snapshot
/// the kind does not carry is ignored without being decoded.
///
/// # Errors
/// Returns [`DecodeError`] for an unknown event name, a malformed key, an
/// undecodable snapshot, or an `INSERT`/`MODIFY` without a new image. A
/// missing old image is not an error.
pub fn normalize(raw: &RawRecord) -> Result<ChangeRecord, DecodeError> {
    let kind: EventKind = raw.event_name.parse()?;
    let keys = wire::decode_item(&raw.change.keys, "Keys")?;
    let key = ItemKey::from_attributes(&keys)?;

    let before = match (&raw.change.old_image, kind.has_before()) {
        (Some(image), true) => Some(wire::decode_item(image, "OldImage")?),
        _ => None,
    };
    let after = match (&raw.change.new_image, kind.has_after()) {
        (Some(image), true) => Some(wire::decode_item(image, "NewImage")?),
        _ => None,
    };

    tracing::trace!(
        kind = %kind,
        key = %key,
        sequence = raw.change.sequence_number.as_deref().unwrap_or("-"),
        "normalized change record"
    );

    ChangeRecord::new(key, kind, before, after)
}
