use chrono::Utc;

use crate::error::{StoreError, StoreResult};
use crate::model::{FilterCriteria, Task, TaskPatch, TaskStatus};
use crate::storage::PersistencePort;

/// Owns the authoritative ordered task list. All mutations flow through the
/// methods here; nothing else writes the list.
///
/// Every mutation is committed to the persistence port *first*, with the
/// prospective snapshot; only on success does the in-memory list change, so a
/// failed write (local I/O, remote auth or ownership) leaves the list exactly
/// as it was. Port failures are additionally recorded in a last-error slot
/// for the UI to surface.
pub struct TaskStore<P: PersistencePort> {
    tasks: Vec<Task>,
    port: P,
    last_error: Option<StoreError>,
}

impl<P: PersistencePort> TaskStore<P> {
    /// Load the prior list through the port. Local adapters degrade malformed
    /// data to an empty list; remote adapters fail here when no user is
    /// signed in.
    pub fn open(mut port: P) -> StoreResult<Self> {
        let tasks = port.load()?;
        Ok(Self {
            tasks,
            port,
            last_error: None,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Most recent persistence/auth failure, if any.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<StoreError> {
        self.last_error.take()
    }

    fn record_port_failure(&mut self, error: StoreError) -> StoreError {
        self.last_error = Some(error.clone());
        tracing::warn!(error = %error, "persistence commit failed");
        error
    }

    /// Append a new incomplete task. Title and tags are trimmed; a title that
    /// trims to nothing is rejected before any id is issued.
    pub fn add(&mut self, title: &str, tags: &str) -> StoreResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let id = self
            .port
            .issue_id(&self.tasks)
            .map_err(|e| self.record_port_failure(e))?;
        debug_assert!(self.get(&id).is_none(), "port issued a duplicate id");

        let now = Utc::now();
        let task = Task {
            id,
            title: title.to_string(),
            tags: tags.trim().to_string(),
            status: TaskStatus::Incomplete,
            created_at: now,
            updated_at: now,
        };

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.port
            .commit_create(&task, &next)
            .map_err(|e| self.record_port_failure(e))?;
        self.tasks = next;
        Ok(task)
    }

    /// Merge the provided fields into the task with the given id. A patch
    /// title that trims to nothing is rejected like an empty add.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> StoreResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(StoreError::EmptyTitle);
            }
        }

        let mut updated = self.tasks[index].clone();
        patch.apply(&mut updated);
        updated.updated_at = Utc::now();

        let mut next = self.tasks.clone();
        next[index] = updated.clone();
        self.port
            .commit_update(&updated, &next)
            .map_err(|e| self.record_port_failure(e))?;
        self.tasks = next;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut next = self.tasks.clone();
        next.remove(index);
        let id = id.to_string();
        self.port
            .commit_delete(&id, &next)
            .map_err(|e| self.record_port_failure(e))?;
        self.tasks = next;
        Ok(())
    }

    pub fn toggle_status(&mut self, id: &str) -> StoreResult<()> {
        let current = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .status;
        self.update(id, TaskPatch::status(current.toggled()))
    }

    /// Order-preserving subsequence of the authoritative list matching the
    /// criteria. Pure; recomputed on every call.
    pub fn filtered_view(&self, criteria: &FilterCriteria) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| criteria.matches(t))
            .cloned()
            .collect()
    }

    /// Move the task at `from` so it ends up at index `to` of the resulting
    /// list. Operates on the authoritative list only; reordering a filtered
    /// view would scramble the canonical order.
    pub fn reorder(&mut self, from: usize, to: usize) -> StoreResult<()> {
        let len = self.tasks.len();
        if from >= len {
            return Err(StoreError::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(StoreError::IndexOutOfBounds { index: to, len });
        }
        if from == to {
            return Ok(());
        }

        let mut next = self.tasks.clone();
        let task = next.remove(from);
        next.insert(to, task);
        self.port
            .commit_reorder(&next)
            .map_err(|e| self.record_port_failure(e))?;
        self.tasks = next;
        Ok(())
    }

    pub fn reorder_by_id(&mut self, id: &str, to: usize) -> StoreResult<()> {
        let from = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.reorder(from, to)
    }

    /// Replace the list wholesale with a snapshot pushed by the realtime
    /// subscription. Bypasses the port: the snapshot *is* the persisted
    /// state.
    pub fn apply_snapshot(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPort;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn store_with(titles: &[&str]) -> TaskStore<MemoryPort> {
        let mut store = TaskStore::open(MemoryPort::new()).expect("open");
        for title in titles {
            store.add(title, "").expect("add");
        }
        store
    }

    fn titles(store: &TaskStore<MemoryPort>) -> Vec<String> {
        store.tasks().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn add_trims_title_and_tags_and_appends() {
        let mut store = store_with(&[]);
        let task = store.add("  Buy milk  ", "  errand, food ").expect("add");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.tags, "errand, food");
        assert_eq!(task.status, TaskStatus::Incomplete);
        assert_eq!(store.len(), 1);

        let second = store.add("Water plants", "").expect("add");
        assert_eq!(store.tasks()[1].id, second.id);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn add_rejects_blank_titles(#[case] title: &str) {
        let mut store = store_with(&["Existing"]);
        assert_eq!(store.add(title, "tags").unwrap_err(), StoreError::EmptyTitle);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_assigns_unique_increasing_ids() {
        let mut store = store_with(&["a", "b", "c"]);
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        store.delete("2").expect("delete");
        let task = store.add("d", "").expect("add");
        assert_eq!(task.id, "4");
    }

    #[test]
    fn update_merges_fields_and_bumps_updated_at() {
        let mut store = store_with(&["Original"]);
        let before = store.tasks()[0].clone();

        store
            .update(&before.id, TaskPatch::tags("home, weekend"))
            .expect("update");
        let after = store.get(&before.id).expect("task");
        assert_eq!(after.title, "Original");
        assert_eq!(after.tags, "home, weekend");
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut store = store_with(&["a"]);
        assert_eq!(
            store.update("99", TaskPatch::title("x")).unwrap_err(),
            StoreError::NotFound("99".into())
        );
    }

    #[test]
    fn update_rejects_title_that_trims_empty() {
        let mut store = store_with(&["Keep me"]);
        let id = store.tasks()[0].id.clone();
        assert_eq!(
            store.update(&id, TaskPatch::title("  ")).unwrap_err(),
            StoreError::EmptyTitle
        );
        assert_eq!(store.get(&id).unwrap().title, "Keep me");
    }

    #[test]
    fn toggle_twice_restores_the_original_status() {
        let mut store = store_with(&["a"]);
        let id = store.tasks()[0].id.clone();

        store.toggle_status(&id).expect("toggle");
        assert_eq!(store.get(&id).unwrap().status, TaskStatus::Completed);
        store.toggle_status(&id).expect("toggle");
        assert_eq!(store.get(&id).unwrap().status, TaskStatus::Incomplete);
    }

    #[test]
    fn delete_removes_and_preserves_remaining_order() {
        let mut store = store_with(&["a", "b", "c"]);
        store.delete("2").expect("delete");
        assert_eq!(titles(&store), vec!["a", "c"]);
        assert_eq!(
            store.delete("2").unwrap_err(),
            StoreError::NotFound("2".into())
        );
    }

    #[test]
    fn empty_criteria_return_the_full_list_in_order() {
        let mut store = store_with(&["a", "b", "c"]);
        store.toggle_status("2").expect("toggle");

        let view = store.filtered_view(&FilterCriteria::default());
        assert_eq!(view, store.tasks().to_vec());
    }

    #[test]
    fn filtered_view_preserves_relative_order_of_survivors() {
        let mut store = store_with(&["alpha one", "beta", "alpha two"]);
        let view = store.filtered_view(&FilterCriteria {
            search: "alpha".into(),
            ..FilterCriteria::default()
        });
        let titles: Vec<&str> = view.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha one", "alpha two"]);
    }

    #[test]
    fn reorder_moves_first_to_last() {
        let mut store = store_with(&["A", "B", "C"]);
        store.reorder(0, 2).expect("reorder");
        assert_eq!(titles(&store), vec!["B", "C", "A"]);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(2, 0)]
    #[case(1, 3)]
    #[case(3, 1)]
    fn reorder_then_inverse_restores_order(#[case] from: usize, #[case] to: usize) {
        let mut store = store_with(&["a", "b", "c", "d"]);
        let original = titles(&store);

        store.reorder(from, to).expect("reorder");
        store.reorder(to, from).expect("reorder back");
        assert_eq!(titles(&store), original);
    }

    #[rstest]
    #[case(3, 0)]
    #[case(0, 3)]
    #[case(7, 7)]
    fn reorder_out_of_range_fails_and_leaves_list_unchanged(
        #[case] from: usize,
        #[case] to: usize,
    ) {
        let mut store = store_with(&["a", "b", "c"]);
        let original = titles(&store);

        let err = store.reorder(from, to).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfBounds { .. }));
        assert_eq!(titles(&store), original);
    }

    #[test]
    fn reorder_same_index_is_a_no_op() {
        let mut store = store_with(&["a", "b"]);
        store.reorder(1, 1).expect("reorder");
        assert_eq!(titles(&store), vec!["a", "b"]);
    }

    #[test]
    fn reorder_by_id_resolves_the_current_index() {
        let mut store = store_with(&["a", "b", "c"]);
        store.reorder_by_id("3", 0).expect("reorder");
        assert_eq!(titles(&store), vec!["c", "a", "b"]);

        assert_eq!(
            store.reorder_by_id("99", 0).unwrap_err(),
            StoreError::NotFound("99".into())
        );
    }

    #[test]
    fn mutations_reach_the_port_snapshot() {
        let mut store = store_with(&["a", "b"]);
        store.toggle_status("1").expect("toggle");
        store.reorder(0, 1).expect("reorder");

        let snapshot = store.port.snapshot().to_vec();
        assert_eq!(snapshot, store.tasks().to_vec());
    }

    struct FailingPort;

    impl PersistencePort for FailingPort {
        fn load(&mut self) -> StoreResult<Vec<Task>> {
            Ok(Vec::new())
        }
        fn issue_id(&mut self, existing: &[Task]) -> StoreResult<crate::model::TaskId> {
            Ok((existing.len() + 1).to_string())
        }
        fn commit_create(&mut self, _: &Task, _: &[Task]) -> StoreResult<()> {
            Err(StoreError::Persistence("disk full".into()))
        }
        fn commit_update(&mut self, _: &Task, _: &[Task]) -> StoreResult<()> {
            Err(StoreError::Persistence("disk full".into()))
        }
        fn commit_delete(&mut self, _: &crate::model::TaskId, _: &[Task]) -> StoreResult<()> {
            Err(StoreError::Persistence("disk full".into()))
        }
        fn commit_reorder(&mut self, _: &[Task]) -> StoreResult<()> {
            Err(StoreError::Persistence("disk full".into()))
        }
    }

    #[test]
    fn failed_commit_leaves_the_list_unchanged_and_records_the_error() {
        let mut store = TaskStore::open(FailingPort).expect("open");
        let err = store.add("Task", "").unwrap_err();
        assert_eq!(err, StoreError::Persistence("disk full".into()));
        assert!(store.is_empty());
        assert_eq!(store.take_last_error(), Some(err));
        assert!(store.last_error().is_none());
    }
}
