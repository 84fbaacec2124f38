//! Tally Aggregation
//!
//! Derives per-product quantity deltas from normalized change records and
//! coalesces them into one net delta per product for a batch.
//!
//! # Core Concepts
//!
//! - [`AggregationPolicy`]: Which rows count (sort-key prefix) and which attribute is tracked
//! - [`numeric_or_zero`]: Missing snapshot or attribute reads as zero
//! - [`record_delta`]: `after - before` for one record, uniform across event kinds
//! - [`DeltaAccumulator`]: Per-key running sum scoped to one batch
//! - [`Aggregator`]: Filter → delta → coalesce over a whole batch
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_aggregate::Aggregator;
//!
//! let deltas = Aggregator::default().aggregate(&records)?;
//! for (product, delta) in deltas.iter() {
//!     println!("{product}: {delta:+}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod accumulator;
mod aggregator;
mod delta;
mod error;
mod policy;

// Re-exports
pub use accumulator::{DeltaAccumulator, NetDelta};
pub use aggregator::{aggregate, Aggregator};
pub use delta::{numeric_or_zero, record_delta};
pub use error::{DeltaError, NotNumeric, OutOfRange, QuantityError};
pub use policy::{AggregationPolicy, DEFAULT_PRODUCT_PREFIX, DEFAULT_QUANTITY_ATTRIBUTE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
