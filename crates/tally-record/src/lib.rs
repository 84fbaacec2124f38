//! Tally Record Layer
//!
//! Turns raw change notifications emitted by the keyed store into typed,
//! immutable [`ChangeRecord`]s.
//!
//! # Core Concepts
//!
//! - [`AttributeValue`]: Closed tagged value (string, number, boolean, binary, list, map, null, sets)
//! - [`Number`]: Store number kept as validated text, convertible to [`Decimal`]
//! - [`wire`]: Decoder/encoder for the store's self-describing tagged JSON
//! - [`ItemKey`]: Composite `(pk, sk)` row identity
//! - [`ChangeRecord`]: Normalized `{key, kind, before, after}`
//! - [`normalize`]: Raw stream record → [`ChangeRecord`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_record::{normalize, StreamEvent};
//!
//! let event = StreamEvent::from_json(payload)?;
//! for raw in &event.records {
//!     let record = normalize(raw)?;
//!     println!("{} {}", record.kind(), record.key());
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod event;
mod key;
mod normalize;
mod number;
mod record;
mod value;
pub mod wire;

// Re-exports
pub use error::DecodeError;
pub use event::{RawChange, RawRecord, StreamEvent};
pub use key::{ItemKey, PARTITION_KEY, SORT_KEY};
pub use normalize::normalize;
pub use number::Number;
pub use record::{ChangeRecord, EventKind};
pub use value::{AttributeValue, Attributes};

/// Exact decimal used for quantity arithmetic
pub use rust_decimal::Decimal;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
