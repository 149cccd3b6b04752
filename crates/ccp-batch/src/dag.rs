//! DAG validation over `dependsOn`: missing references and cycles are both
//! rejected before a single operation executes.

use crate::error::BatchError;
use crate::operation::BatchOperation;
use std::collections::{HashMap, HashSet};

pub fn validate_dag(operations: &[BatchOperation]) -> Result<(), BatchError> {
    let ids: HashSet<&str> = operations.iter().map(|op| op.id.as_str()).collect();

    for op in operations {
        for dep in &op.depends_on {
            if !ids.contains(dep.as_str()) {
                return Err(BatchError::MissingDependency {
                    operation_id: op.id.clone(),
                    missing: dep.clone(),
                });
            }
        }
    }

    detect_cycle(operations)
}

fn detect_cycle(operations: &[BatchOperation]) -> Result<(), BatchError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let by_id: HashMap<&str, &BatchOperation> = operations.iter().map(|op| (op.id.as_str(), op)).collect();
    let mut marks: HashMap<&str, Mark> = operations.iter().map(|op| (op.id.as_str(), Mark::Unvisited)).collect();

    fn visit<'a>(
        id: &'a str,
        by_id: &HashMap<&'a str, &'a BatchOperation>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<(), BatchError> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(BatchError::DependencyCycle { operation_id: id.to_string() });
            }
            _ => {}
        }

        marks.insert(id, Mark::InProgress);
        if let Some(op) = by_id.get(id) {
            for dep in &op.depends_on {
                visit(dep, by_id, marks)?;
            }
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }

    for op in operations {
        visit(&op.id, &by_id, &mut marks)?;
    }

    Ok(())
}
