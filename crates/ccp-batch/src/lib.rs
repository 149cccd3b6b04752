//! Dependency-aware database batch executor with rollback and progress
//! reporting.
//!
//! [`executor::DatabaseBatch`] accumulates [`operation::BatchOperation`]s
//! and executes them under a [`config::Strategy`], validating the
//! dependency DAG ([`dag`]) up front and optionally capturing pre-images
//! for [`rollback`] on failure.

pub mod config;
pub mod dag;
pub mod error;
pub mod executor;
pub mod operation;
pub mod progress;
pub mod rollback;

pub use config::{BatchConfig, Strategy};
pub use error::BatchError;
pub use executor::{BatchReport, DatabaseBatch, OperationOutcome};
pub use operation::{BatchOperation, OperationKind, MAX_BATCH_SIZE, MAX_PAYLOAD_BYTES};
pub use progress::Progress;
