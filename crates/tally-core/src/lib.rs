//! Tally Core - Batch Handler
//!
//! Runs one delivered batch end to end:
//! - Normalizes every raw record (any decode failure fails the batch)
//! - Aggregates eligible records into one net delta per product
//! - Fans out one atomic additive write per product to the counter store
//!
//! The counter store is injected as an [`Arc<dyn CounterStore>`](CounterStore),
//! so tests substitute [`InMemoryCounterStore`] or a mock.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally_core::{BatchHandler, HandlerConfig, InMemoryCounterStore};
//!
//! # async fn example(event: tally_record::StreamEvent) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryCounterStore::new());
//! let handler = BatchHandler::new(HandlerConfig::new("shopping-cart"), store)?;
//!
//! let ack = handler.handle(&event).await?;
//! println!("issued {} writes", ack.writes_issued);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod fanout;
pub mod handler;
pub mod retry;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::{HandlerConfig, DEFAULT_AGGREGATE_SORT_KEY, DEFAULT_MAX_CONCURRENT_WRITES};
pub use error::{BatchError, ConfigError, StoreWriteError, WriteFailure};
pub use fanout::{FanOutReport, WriteFanOut};
pub use handler::BatchHandler;
pub use retry::RetryPolicy;
pub use store::{AddRequest, CounterStore, InMemoryCounterStore};
pub use types::{Acknowledgement, BatchId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running batches
    pub use crate::{
        Acknowledgement, BatchError, BatchHandler, CounterStore, HandlerConfig,
        InMemoryCounterStore, RetryPolicy,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
