//! A single operation inside a [`crate::executor::DatabaseBatch`].

use ccp_core::store::{Filter, Row};
use serde_json::Value;

pub const MAX_BATCH_SIZE: usize = 10_000;
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub enum OperationKind {
    Insert { data: Row },
    Update { filter: Filter, data: Row },
    Upsert { conflict_columns: Vec<String>, data: Row },
    Delete { filter: Filter },
}

impl OperationKind {
    pub fn is_mutating_row_capture_needed(&self) -> bool {
        matches!(self, OperationKind::Update { .. } | OperationKind::Delete { .. })
    }

    pub fn table_payload_size(&self) -> usize {
        let estimate = |row: &Row| serde_json::to_vec(&Value::Object(row.clone())).map(|b| b.len()).unwrap_or(0);
        match self {
            OperationKind::Insert { data } | OperationKind::Upsert { data, .. } => estimate(data),
            OperationKind::Update { data, .. } => estimate(data),
            OperationKind::Delete { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOperation {
    pub id: String,
    pub table: String,
    pub kind: OperationKind,
    pub depends_on: Vec<String>,
    pub retry_max_attempts: Option<u32>,
}

impl BatchOperation {
    pub fn new(id: impl Into<String>, table: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            id: id.into(),
            table: table.into(),
            kind,
            depends_on: Vec::new(),
            retry_max_attempts: None,
        }
    }

    pub fn depends_on(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retry_max_attempts(mut self, n: u32) -> Self {
        self.retry_max_attempts = Some(n);
        self
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, checked by hand rather than compiling a
    /// regex for a single-character-class pattern this simple.
    pub fn table_name_is_valid(table: &str) -> bool {
        let mut chars = table.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
