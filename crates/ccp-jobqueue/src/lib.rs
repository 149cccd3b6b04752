//! Priority- and dependency-aware job queue with content-hash
//! deduplication and result caching.
//!
//! [`queue::JobQueue::enqueue`] is the single write path; everything else in
//! this crate exists to support it: [`hash`] computes the dedup key,
//! [`job`] defines the record shape, and [`result_cache`] holds the
//! short-circuit cache that lets a repeat request skip straight to a
//! completed result instead of a fresh pending row.

pub mod hash;
pub mod job;
pub mod queue;
pub mod result_cache;

pub use hash::{canonical_json, hash32_base36, job_hash};
pub use job::{Job, JobStatus, JobType, Priority};
pub use queue::{EnqueueOptions, EnqueueOutcome, JobQueue, JobQueueError};
pub use result_cache::{ResultCache, ResultCacheEntry};
