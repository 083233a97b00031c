use std::fs;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::{StoreError, StoreResult};
use crate::model::{Task, TaskId};
use crate::storage::PersistencePort;

/// Whole-list snapshot persistence: the task array is serialized as JSON into
/// a single file under the data directory and rewritten after every mutation.
///
/// A missing or malformed file degrades to an empty list by design; only I/O
/// failures surface as [`StoreError::Persistence`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            path: config.store_path().to_path_buf(),
        }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn parse_snapshot(body: &str) -> StoreResult<Vec<Task>> {
        serde_json::from_str::<Vec<Task>>(body)
            .map_err(|e| StoreError::MalformedData(e.to_string()))
    }

    fn write_snapshot(&self, tasks: &[Task]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Persistence(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let body = serde_json::to_string_pretty(tasks)
            .map_err(|e| StoreError::Persistence(format!("failed to serialize tasks: {e}")))?;
        fs::write(&self.path, body).map_err(|e| {
            StoreError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

impl PersistencePort for LocalStore {
    fn load(&mut self) -> StoreResult<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let body = fs::read_to_string(&self.path).map_err(|e| {
            StoreError::Persistence(format!("failed to read {}: {e}", self.path.display()))
        })?;
        match Self::parse_snapshot(&body) {
            Ok(tasks) => Ok(tasks),
            Err(e @ StoreError::MalformedData(_)) => {
                // Malformed prior data is discarded, not fatal.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "discarding malformed task snapshot"
                );
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    fn issue_id(&mut self, existing: &[Task]) -> StoreResult<TaskId> {
        let next = existing
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Ok(next.to_string())
    }

    fn commit_create(&mut self, _created: &Task, next: &[Task]) -> StoreResult<()> {
        self.write_snapshot(next)
    }

    fn commit_update(&mut self, _updated: &Task, next: &[Task]) -> StoreResult<()> {
        self.write_snapshot(next)
    }

    fn commit_delete(&mut self, _id: &TaskId, next: &[Task]) -> StoreResult<()> {
        self.write_snapshot(next)
    }

    fn commit_reorder(&mut self, next: &[Task]) -> StoreResult<()> {
        self.write_snapshot(next)
    }
}
