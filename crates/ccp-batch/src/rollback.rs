//! Pre-image capture and reverse-order rollback.
//!
//! Updates and deletes capture their pre-image via a `SELECT *` with the
//! same filter before mutating. On failure, rollback replays the captured
//! rows in reverse order: deletes are undone by re-inserting, updates by
//! re-updating on `id`. A rollback failure is logged and skipped — it never
//! masks the original error.

use ccp_core::store::{DataStore, Filter, LogLevel, LogLine, Row};

#[derive(Debug, Clone)]
pub enum RollbackEntry {
    ReInsert { table: String, row: Row },
    ReUpdate { table: String, row: Row },
}

pub async fn capture_pre_image(store: &dyn DataStore, table: &str, filter: &Filter) -> Vec<Row> {
    store.select(table, filter, &ccp_core::store::Page::default()).await.unwrap_or_default()
}

/// Replays `entries` in reverse. Best-effort: a failing entry is logged and
/// the rest still get a chance to roll back.
pub async fn rollback_all(store: &dyn DataStore, entries: &[RollbackEntry]) {
    for entry in entries.iter().rev() {
        let outcome = match entry {
            RollbackEntry::ReInsert { table, row } => store.insert(table, row.clone()).await.map(|_| ()),
            RollbackEntry::ReUpdate { table, row } => {
                let Some(id) = row.get("id").cloned() else {
                    continue;
                };
                let filter = Filter::new().eq("id", id);
                store.update(table, &filter, row.clone()).await.map(|_| ())
            }
        };

        if let Err(err) = outcome {
            let table = match entry {
                RollbackEntry::ReInsert { table, .. } | RollbackEntry::ReUpdate { table, .. } => table.clone(),
            };
            LogLine::new(LogLevel::Error, "ccp-batch", "rollback step failed, skipping")
                .with_context("table", table)
                .with_context("error", err.to_string())
                .emit();
        }
    }
}
