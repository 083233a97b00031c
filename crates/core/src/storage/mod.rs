pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::{RemoteBackend, RemotePort, SharedBackend, Subscription, TaskDocument};

use crate::error::StoreResult;
use crate::model::{Task, TaskId};

/// The load/save contract a storage backend must satisfy. The store calls a
/// commit method with the prospective post-mutation snapshot *before* it
/// mutates its in-memory list, so a failed commit leaves the authoritative
/// list untouched.
pub trait PersistencePort {
    /// Load the full task list. Malformed prior data is the adapter's problem
    /// to degrade gracefully, not a startup failure.
    fn load(&mut self) -> StoreResult<Vec<Task>>;

    /// Issue a fresh id, unique among `existing`.
    fn issue_id(&mut self, existing: &[Task]) -> StoreResult<TaskId>;

    fn commit_create(&mut self, created: &Task, next: &[Task]) -> StoreResult<()>;
    fn commit_update(&mut self, updated: &Task, next: &[Task]) -> StoreResult<()>;
    fn commit_delete(&mut self, id: &TaskId, next: &[Task]) -> StoreResult<()>;
    fn commit_reorder(&mut self, next: &[Task]) -> StoreResult<()>;
}

/// Keeps everything in memory. Used by tests and as a scratch backend for
/// embedding the store without any persistence at all.
#[derive(Debug, Default)]
pub struct MemoryPort {
    snapshot: Vec<Task>,
    next_id: u64,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            snapshot: tasks,
            next_id,
        }
    }

    pub fn snapshot(&self) -> &[Task] {
        &self.snapshot
    }
}

impl PersistencePort for MemoryPort {
    fn load(&mut self) -> StoreResult<Vec<Task>> {
        Ok(self.snapshot.clone())
    }

    fn issue_id(&mut self, existing: &[Task]) -> StoreResult<TaskId> {
        let max_seen = existing
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(max_seen) + 1;
        Ok(self.next_id.to_string())
    }

    fn commit_create(&mut self, _created: &Task, next: &[Task]) -> StoreResult<()> {
        self.snapshot = next.to_vec();
        Ok(())
    }

    fn commit_update(&mut self, _updated: &Task, next: &[Task]) -> StoreResult<()> {
        self.snapshot = next.to_vec();
        Ok(())
    }

    fn commit_delete(&mut self, _id: &TaskId, next: &[Task]) -> StoreResult<()> {
        self.snapshot = next.to_vec();
        Ok(())
    }

    fn commit_reorder(&mut self, next: &[Task]) -> StoreResult<()> {
        self.snapshot = next.to_vec();
        Ok(())
    }
}
