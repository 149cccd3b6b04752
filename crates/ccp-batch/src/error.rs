//! Errors surfaced by the batch executor.

#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    #[error("batch exceeds max size of {max} operations")]
    TooManyOperations { max: usize },
    #[error("operation {operation_id} payload exceeds {max} bytes")]
    PayloadTooLarge { operation_id: String, max: usize },
    #[error("table name {table} is invalid")]
    InvalidTableName { table: String },
    #[error("operation {operation_id} depends on unknown operation {missing}")]
    MissingDependency { operation_id: String, missing: String },
    #[error("dependency cycle detected at operation {operation_id}")]
    DependencyCycle { operation_id: String },
    #[error("DEPENDENCY_ERROR: operation {operation_id} failed because dependency {parent_id} errored")]
    DependencyError { operation_id: String, parent_id: String },
    #[error("operation {operation_id} timed out waiting on dependencies")]
    DependencyTimeout { operation_id: String },
    #[error("operation {operation_id} failed: {source}")]
    OperationFailed {
        operation_id: String,
        #[source]
        source: ccp_core::store::StoreError,
    },
    #[error("batch execution timed out")]
    Timeout,
}
