//! Correlation identifiers threaded through logs, audit rows and lock
//! ownership for a single domain operation.

use std::fmt;
use uuid::Uuid;

/// A short, opaque identifier generated once per domain operation (e.g. one
/// `enforce_quota_with_lock` call) and passed down through every log line,
/// audit record and lock acquisition it causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generates a new random correlation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form: only the first segment, matching the size of the
        // correlation ids the platform's upstream services already emit.
        write!(f, "{}", self.0.as_simple().to_string().split_at(8).0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
