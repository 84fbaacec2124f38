//! Tally Handler
//!
//! Process edge of the aggregator:
//! - [`config`]: Load [`HandlerConfig`](tally_core::HandlerConfig) from TOML and environment
//! - [`logging`]: Install the `tracing` subscriber
//! - [`replay`]: Run a recorded stream event through the handler against an in-memory store
//!
//! The `tally` binary wires these together behind a CLI.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod logging;
pub mod replay;

pub use config::{ConfigLoadError, MAX_CONCURRENT_WRITES_ENV, TABLE_NAME_ENV};
pub use logging::LogFormat;
pub use replay::{normalize_event, replay, replay_event, ReplayError, ReplayOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
