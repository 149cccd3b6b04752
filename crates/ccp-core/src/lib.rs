//! Shared infrastructure for the content-automation control plane.
//!
//! This crate provides the primitives every other `ccp-*` crate builds on:
//! - an observability event system ([`events`])
//! - a unified error type for composed layers ([`error`])
//! - cooperative cancellation ([`cancellation`])
//! - correlation identifiers ([`correlation`])

pub mod cancellation;
pub mod correlation;
pub mod error;
pub mod events;
pub mod store;

pub use cancellation::{CancellationToken, Cancelled};
pub use correlation::CorrelationId;
pub use error::ControlError;
pub use events::{EventListener, ResilienceEvent};
pub use store::{DataStore, Filter, FilterOp, LogLevel, LogLine, Page, Row, StoreError};
