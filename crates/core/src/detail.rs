use crate::error::StoreResult;
use crate::model::{Task, TaskId, TaskPatch};
use crate::storage::PersistencePort;
use crate::store::TaskStore;

/// Where the edit modal currently is. The controller holds the open task's
/// id, never a copy of the task; display data is always re-fetched from the
/// store so the two can't diverge.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Closed,
    Open {
        id: TaskId,
    },
    Editing {
        id: TaskId,
        draft_tags: String,
    },
}

/// Drives the single "currently open" task. All task mutations are routed
/// through the store; the controller never writes a task directly.
#[derive(Debug, Clone, Default)]
pub struct DetailController {
    state: DetailState,
}

impl DetailController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DetailState::Closed)
    }

    /// Id of the open task in either `Open` or `Editing`.
    pub fn open_id(&self) -> Option<&TaskId> {
        match &self.state {
            DetailState::Closed => None,
            DetailState::Open { id } | DetailState::Editing { id, .. } => Some(id),
        }
    }

    pub fn draft_tags(&self) -> Option<&str> {
        match &self.state {
            DetailState::Editing { draft_tags, .. } => Some(draft_tags),
            _ => None,
        }
    }

    /// Open the modal on a task, discarding any prior draft.
    pub fn open(&mut self, task: &Task) {
        self.state = DetailState::Open {
            id: task.id.clone(),
        };
    }

    /// Close without mutating the task; any draft is discarded.
    pub fn close(&mut self) {
        self.state = DetailState::Closed;
    }

    /// Enter tag editing, seeding the draft from the task's current tags.
    /// No-op while closed.
    pub fn begin_edit_tags<P: PersistencePort>(&mut self, store: &TaskStore<P>) {
        if let Some(id) = self.open_id().cloned() {
            let draft_tags = store
                .get(&id)
                .map(|t| t.tags.clone())
                .unwrap_or_default();
            self.state = DetailState::Editing { id, draft_tags };
        }
    }

    pub fn set_draft_tags(&mut self, text: impl Into<String>) {
        if let DetailState::Editing { draft_tags, .. } = &mut self.state {
            *draft_tags = text.into();
        }
    }

    /// Leave editing. A draft that trims to nothing leaves the task's tags
    /// unchanged; that is a no-op, not an error.
    pub fn confirm_edit_tags<P: PersistencePort>(
        &mut self,
        store: &mut TaskStore<P>,
    ) -> StoreResult<()> {
        let DetailState::Editing { id, draft_tags } = std::mem::take(&mut self.state) else {
            return Ok(());
        };
        self.state = DetailState::Open { id: id.clone() };

        let trimmed = draft_tags.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        store.update(&id, TaskPatch::tags(trimmed))
    }

    /// Toggle the open task's status through the store.
    pub fn toggle_status<P: PersistencePort>(
        &mut self,
        store: &mut TaskStore<P>,
    ) -> StoreResult<()> {
        match self.open_id().cloned() {
            Some(id) => store.toggle_status(&id),
            None => Ok(()),
        }
    }

    /// The open task, re-fetched from the store on every read.
    pub fn task<'a, P: PersistencePort>(&self, store: &'a TaskStore<P>) -> Option<&'a Task> {
        store.get(self.open_id()?)
    }

    /// Called when a task disappears (delete or remote snapshot); closes the
    /// modal if it was showing that task so the reference cannot dangle.
    pub fn invalidate(&mut self, id: &str) {
        if self.open_id().map(|open| open == id).unwrap_or(false) {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use crate::storage::MemoryPort;
    use pretty_assertions::assert_eq;

    fn store_with(titles: &[&str]) -> TaskStore<MemoryPort> {
        let mut store = TaskStore::open(MemoryPort::new()).expect("open");
        for title in titles {
            store.add(title, "initial").expect("add");
        }
        store
    }

    #[test]
    fn open_then_close_never_touches_the_task() {
        let mut store = store_with(&["a"]);
        let task = store.tasks()[0].clone();

        let mut detail = DetailController::new();
        detail.open(&task);
        assert_eq!(detail.open_id(), Some(&task.id));

        detail.close();
        assert_eq!(detail.state(), &DetailState::Closed);
        assert_eq!(store.tasks()[0], task);
    }

    #[test]
    fn begin_edit_seeds_draft_from_current_tags() {
        let store = store_with(&["a"]);
        let task = store.tasks()[0].clone();

        let mut detail = DetailController::new();
        detail.open(&task);
        detail.begin_edit_tags(&store);
        assert_eq!(detail.draft_tags(), Some("initial"));
    }

    #[test]
    fn confirm_writes_trimmed_draft_through_the_store() {
        let mut store = store_with(&["a"]);
        let task = store.tasks()[0].clone();

        let mut detail = DetailController::new();
        detail.open(&task);
        detail.begin_edit_tags(&store);
        detail.set_draft_tags("  home, urgent  ");
        detail.confirm_edit_tags(&mut store).expect("confirm");

        assert_eq!(store.get(&task.id).unwrap().tags, "home, urgent");
        assert_eq!(detail.state(), &DetailState::Open { id: task.id });
    }

    #[test]
    fn empty_draft_confirm_is_a_no_op() {
        let mut store = store_with(&["a"]);
        let task = store.tasks()[0].clone();

        let mut detail = DetailController::new();
        detail.open(&task);
        detail.begin_edit_tags(&store);
        detail.set_draft_tags("   ");
        detail.confirm_edit_tags(&mut store).expect("confirm");

        assert_eq!(store.get(&task.id).unwrap().tags, "initial");
        assert_eq!(detail.state(), &DetailState::Open { id: task.id });
    }

    #[test]
    fn close_discards_the_draft() {
        let mut store = store_with(&["a"]);
        let task = store.tasks()[0].clone();

        let mut detail = DetailController::new();
        detail.open(&task);
        detail.begin_edit_tags(&store);
        detail.set_draft_tags("scratch");
        detail.close();

        assert_eq!(detail.draft_tags(), None);
        assert_eq!(store.get(&task.id).unwrap().tags, "initial");
    }

    #[test]
    fn toggle_keeps_the_view_consistent_with_the_store() {
        let mut store = store_with(&["a"]);
        let task = store.tasks()[0].clone();

        let mut detail = DetailController::new();
        detail.open(&task);
        detail.toggle_status(&mut store).expect("toggle");

        // The controller holds no copy, so the re-fetch sees the new status.
        assert_eq!(
            detail.task(&store).unwrap().status,
            TaskStatus::Completed
        );
    }

    #[test]
    fn invalidate_closes_only_for_the_matching_id() {
        let store = store_with(&["a", "b"]);
        let mut detail = DetailController::new();
        detail.open(&store.tasks()[1]);

        detail.invalidate("1");
        assert!(detail.is_open());
        detail.invalidate("2");
        assert_eq!(detail.state(), &DetailState::Closed);
    }
}
