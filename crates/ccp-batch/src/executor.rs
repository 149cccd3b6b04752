//! `DatabaseBatch`: accumulates operations and executes them under one of
//! three strategies, with optional transactions, rollback and progress
//! reporting.

use crate::config::{BatchConfig, Strategy};
use crate::dag::validate_dag;
use crate::error::BatchError;
use crate::operation::{BatchOperation, OperationKind, MAX_BATCH_SIZE, MAX_PAYLOAD_BYTES};
use crate::progress::{Progress, ProgressCallback};
use crate::rollback::{capture_pre_image, rollback_all, RollbackEntry};
use ccp_core::cancellation::CancellationToken;
use ccp_core::store::{DataStore, Row, StoreError};
use ccp_retry::call::retry_call;
use ccp_retry::RetryConfigBuilder;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpStatus {
    Pending,
    Completed,
    Errored,
}

#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub operation_id: String,
    pub result: Result<Row, String>,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub correlation_id: String,
    pub progress: Progress,
    pub outcomes: Vec<OperationOutcome>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.progress.failed == 0
    }
}

pub struct DatabaseBatch {
    store: Arc<dyn DataStore>,
    config: BatchConfig,
    operations: Vec<BatchOperation>,
    correlation_id: String,
    on_progress: Option<ProgressCallback>,
}

impl DatabaseBatch {
    pub fn new(store: Arc<dyn DataStore>, config: BatchConfig) -> Self {
        Self {
            store,
            config,
            operations: Vec::new(),
            correlation_id: Uuid::new_v4().to_string(),
            on_progress: None,
        }
    }

    pub fn add(mut self, operation: BatchOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    fn validate(&self) -> Result<(), BatchError> {
        if self.operations.len() > MAX_BATCH_SIZE {
            return Err(BatchError::TooManyOperations { max: MAX_BATCH_SIZE });
        }
        for op in &self.operations {
            if !BatchOperation::table_name_is_valid(&op.table) {
                return Err(BatchError::InvalidTableName { table: op.table.clone() });
            }
            if op.kind.table_payload_size() > MAX_PAYLOAD_BYTES {
                return Err(BatchError::PayloadTooLarge { operation_id: op.id.clone(), max: MAX_PAYLOAD_BYTES });
            }
        }
        validate_dag(&self.operations)
    }

    pub async fn execute(self) -> Result<BatchReport, BatchError> {
        self.validate()?;

        let total = self.operations.len();
        let started_at = Instant::now();
        let statuses: Arc<Mutex<HashMap<String, OpStatus>>> =
            Arc::new(Mutex::new(self.operations.iter().map(|op| (op.id.clone(), OpStatus::Pending)).collect()));
        let outcomes: Arc<Mutex<Vec<OperationOutcome>>> = Arc::new(Mutex::new(Vec::new()));
        let rollback_log: Arc<Mutex<Vec<RollbackEntry>>> = Arc::new(Mutex::new(Vec::new()));

        let run = self.run_strategy(statuses.clone(), outcomes.clone(), rollback_log.clone());

        let timed_out = match self.config.global_timeout {
            Some(timeout) => tokio::time::timeout(timeout, run).await.is_err(),
            None => {
                run.await;
                false
            }
        };

        let outcomes = Arc::try_unwrap(outcomes).map(|m| m.into_inner().unwrap()).unwrap_or_default();
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let completed = outcomes.iter().filter(|o| o.result.is_ok()).count();

        let mut progress = Progress::new(total);
        progress.update(completed, failed, started_at.elapsed());
        if let Some(cb) = &self.on_progress {
            cb(progress);
        }

        if (failed > 0 || timed_out) && self.config.enable_rollback {
            let entries = rollback_log.lock().unwrap().clone();
            rollback_all(self.store.as_ref(), &entries).await;
        }

        if timed_out {
            return Err(BatchError::Timeout);
        }

        Ok(BatchReport { correlation_id: self.correlation_id, progress, outcomes })
    }

    async fn run_strategy(
        &self,
        statuses: Arc<Mutex<HashMap<String, OpStatus>>>,
        outcomes: Arc<Mutex<Vec<OperationOutcome>>>,
        rollback_log: Arc<Mutex<Vec<RollbackEntry>>>,
    ) {
        match self.config.strategy {
            Strategy::Sequential => self.run_sequential(statuses, outcomes, rollback_log).await,
            Strategy::Parallel => self.run_parallel(statuses, outcomes, rollback_log).await,
            Strategy::Smart => self.run_smart(statuses, outcomes, rollback_log).await,
        }
    }

    async fn run_sequential(
        &self,
        statuses: Arc<Mutex<HashMap<String, OpStatus>>>,
        outcomes: Arc<Mutex<Vec<OperationOutcome>>>,
        rollback_log: Arc<Mutex<Vec<RollbackEntry>>>,
    ) {
        for op in &self.operations {
            if let Err(err) = wait_for_dependencies(op, &statuses, self.config.dependency_poll_interval, self.config.dependency_timeout).await {
                record(&statuses, &outcomes, op, Err(err));
                continue;
            }
            let result = execute_operation(self.store.as_ref(), op, self.config.enable_rollback, &rollback_log, &self.config).await;
            record(&statuses, &outcomes, op, result);
        }
    }

    async fn run_parallel(
        &self,
        statuses: Arc<Mutex<HashMap<String, OpStatus>>>,
        outcomes: Arc<Mutex<Vec<OperationOutcome>>>,
        rollback_log: Arc<Mutex<Vec<RollbackEntry>>>,
    ) {
        let futures = self.operations.iter().map(|op| {
            let statuses = statuses.clone();
            let outcomes = outcomes.clone();
            let rollback_log = rollback_log.clone();
            let store = self.store.clone();
            let poll = self.config.dependency_poll_interval;
            let timeout = self.config.dependency_timeout;
            let enable_rollback = self.config.enable_rollback;
            let config = self.config.clone();
            async move {
                if let Err(err) = wait_for_dependencies(op, &statuses, poll, timeout).await {
                    record(&statuses, &outcomes, op, Err(err));
                    return;
                }
                let result = execute_operation(store.as_ref(), op, enable_rollback, &rollback_log, &config).await;
                record(&statuses, &outcomes, op, result);
            }
        });
        futures::future::join_all(futures).await;
    }

    /// Groups operations into dependency-respecting waves, then within each
    /// wave runs insert/upsert concurrently, then updates/deletes
    /// concurrently — insert/upsert -> update -> delete when transactions
    /// are enabled. Same-table inserts/upserts in a wave run
    /// concurrently rather than as one call: the store contract only
    /// exposes single-row insert.
    async fn run_smart(
        &self,
        statuses: Arc<Mutex<HashMap<String, OpStatus>>>,
        outcomes: Arc<Mutex<Vec<OperationOutcome>>>,
        rollback_log: Arc<Mutex<Vec<RollbackEntry>>>,
    ) {
        let waves = topological_waves(&self.operations);

        for wave in waves {
            let (mut inserts, mut updates, mut deletes) = (Vec::new(), Vec::new(), Vec::new());
            for idx in wave {
                let op = &self.operations[idx];
                match &op.kind {
                    OperationKind::Insert { .. } | OperationKind::Upsert { .. } => inserts.push(op),
                    OperationKind::Update { .. } => updates.push(op),
                    OperationKind::Delete { .. } => deletes.push(op),
                }
            }

            let groups = if self.config.enable_transactions {
                vec![inserts, updates, deletes]
            } else {
                vec![inserts.into_iter().chain(updates).chain(deletes).collect()]
            };

            for group in groups {
                let futures = group.into_iter().map(|op| {
                    let statuses = statuses.clone();
                    let outcomes = outcomes.clone();
                    let rollback_log = rollback_log.clone();
                    let store = self.store.clone();
                    let enable_rollback = self.config.enable_rollback;
                    let config = self.config.clone();
                    async move {
                        let result = execute_operation(store.as_ref(), op, enable_rollback, &rollback_log, &config).await;
                        record(&statuses, &outcomes, op, result);
                    }
                });
                futures::future::join_all(futures).await;
            }
        }
    }
}

fn record(
    statuses: &Arc<Mutex<HashMap<String, OpStatus>>>,
    outcomes: &Arc<Mutex<Vec<OperationOutcome>>>,
    op: &BatchOperation,
    result: Result<Row, BatchError>,
) {
    let status = if result.is_ok() { OpStatus::Completed } else { OpStatus::Errored };
    statuses.lock().unwrap().insert(op.id.clone(), status);
    outcomes.lock().unwrap().push(OperationOutcome {
        operation_id: op.id.clone(),
        result: result.map_err(|e| e.to_string()),
    });
}

async fn wait_for_dependencies(
    op: &BatchOperation,
    statuses: &Arc<Mutex<HashMap<String, OpStatus>>>,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), BatchError> {
    if op.depends_on.is_empty() {
        return Ok(());
    }
    let deadline = Instant::now() + timeout;
    loop {
        {
            let map = statuses.lock().unwrap();
            let mut all_done = true;
            for dep in &op.depends_on {
                match map.get(dep) {
                    Some(OpStatus::Completed) => {}
                    Some(OpStatus::Errored) => {
                        return Err(BatchError::DependencyError { operation_id: op.id.clone(), parent_id: dep.clone() });
                    }
                    _ => all_done = false,
                }
            }
            if all_done {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            return Err(BatchError::DependencyTimeout { operation_id: op.id.clone() });
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Runs a single operation's store call under a retry config: the
/// operation's own `retry_max_attempts` override takes precedence over the
/// batch-level default. Only `StoreError::Backend` (transient
/// backend failures) is retried; `NotFound`/`UniqueViolation` are
/// definitive and surface on the first attempt.
async fn execute_operation(
    store: &dyn DataStore,
    op: &BatchOperation,
    enable_rollback: bool,
    rollback_log: &Arc<Mutex<Vec<RollbackEntry>>>,
    batch_config: &BatchConfig,
) -> Result<Row, BatchError> {
    if enable_rollback {
        match &op.kind {
            OperationKind::Update { filter, .. } => {
                for pre_image in capture_pre_image(store, &op.table, filter).await {
                    rollback_log.lock().unwrap().push(RollbackEntry::ReUpdate { table: op.table.clone(), row: pre_image });
                }
            }
            OperationKind::Delete { filter } => {
                for pre_image in capture_pre_image(store, &op.table, filter).await {
                    rollback_log.lock().unwrap().push(RollbackEntry::ReInsert { table: op.table.clone(), row: pre_image });
                }
            }
            _ => {}
        }
    }

    let max_attempts = op.retry_max_attempts.map(|n| n as usize).unwrap_or(batch_config.retry_max_attempts as usize).max(1);
    let config = RetryConfigBuilder::<(), StoreError>::new()
        .max_attempts(max_attempts)
        .exponential_backoff(batch_config.retry_base_delay)
        .retry_on(|error: &StoreError| matches!(error, StoreError::Backend(_)))
        .build_config();
    let token = CancellationToken::new();

    let outcome = retry_call(&config, &token, (), |_| async {
        match &op.kind {
            OperationKind::Insert { data } => store.insert(&op.table, data.clone()).await,
            OperationKind::Upsert { conflict_columns, data } => {
                let columns: Vec<&str> = conflict_columns.iter().map(String::as_str).collect();
                store.upsert(&op.table, &columns, data.clone()).await
            }
            OperationKind::Update { filter, data } => {
                store.update(&op.table, filter, data.clone()).await.map(|rows| rows.into_iter().next().unwrap_or_default())
            }
            OperationKind::Delete { filter } => {
                store.delete(&op.table, filter).await.map(|rows| rows.into_iter().next().unwrap_or_default())
            }
        }
    })
    .await;

    outcome.map_err(|retry_err| BatchError::OperationFailed {
        operation_id: op.id.clone(),
        source: retry_err.last_error.unwrap_or(StoreError::Backend("cancelled before first attempt".into())),
    })
}

fn topological_waves(operations: &[BatchOperation]) -> Vec<Vec<usize>> {
    let n = operations.len();
    let index_of: HashMap<&str, usize> = operations.iter().enumerate().map(|(i, op)| (op.id.as_str(), i)).collect();

    let mut indegree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, op) in operations.iter().enumerate() {
        for dep in &op.depends_on {
            if let Some(&dep_idx) = index_of.get(dep.as_str()) {
                dependents[dep_idx].push(i);
                indegree[i] += 1;
            }
        }
    }

    let mut waves = Vec::new();
    let mut remaining: HashSet<usize> = (0..n).collect();
    let mut current: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();

    while !current.is_empty() {
        for &i in &current {
            remaining.remove(&i);
        }
        let mut next = Vec::new();
        for &i in &current {
            for &dep_idx in &dependents[i] {
                indegree[dep_idx] -= 1;
                if indegree[dep_idx] == 0 {
                    next.push(dep_idx);
                }
            }
        }
        waves.push(current);
        current = next;
    }

    // Any remaining indices indicate a cycle that `validate_dag` should
    // already have rejected; append them as a final wave rather than
    // silently dropping the operations.
    if !remaining.is_empty() {
        waves.push(remaining.into_iter().collect());
    }

    waves
}
