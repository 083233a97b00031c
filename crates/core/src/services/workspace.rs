use crate::detail::{DetailController, DetailState};
use crate::error::{StoreError, StoreResult};
use crate::model::{FilterCriteria, Task, TaskPatch};
use crate::stats::TaskStats;
use crate::storage::PersistencePort;
use crate::store::TaskStore;

/// Input buffers for the "new task" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTaskInput {
    pub title: String,
    pub tags: String,
}

/// Ties the store, the filter criteria, and the detail controller together
/// for a consuming surface. This is the single writer path: every mutation a
/// UI performs goes through here, which is what lets a delete reliably close
/// the detail view and keeps statistics reading the same sequence as the
/// filtered view.
///
/// Statistics are computed over the *filtered* view (a deliberate, fixed
/// choice): the progress ring describes the list on screen.
pub struct Workspace<P: PersistencePort> {
    store: TaskStore<P>,
    criteria: FilterCriteria,
    detail: DetailController,
    draft: NewTaskInput,
}

impl<P: PersistencePort> Workspace<P> {
    pub fn open(port: P) -> StoreResult<Self> {
        Ok(Self {
            store: TaskStore::open(port)?,
            criteria: FilterCriteria::default(),
            detail: DetailController::new(),
            draft: NewTaskInput::default(),
        })
    }

    pub fn store(&self) -> &TaskStore<P> {
        &self.store
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn criteria_mut(&mut self) -> &mut FilterCriteria {
        &mut self.criteria
    }

    pub fn detail(&self) -> &DetailController {
        &self.detail
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.store.last_error()
    }

    pub fn take_last_error(&mut self) -> Option<StoreError> {
        self.store.take_last_error()
    }

    // -- task list -----------------------------------------------------

    pub fn add_task(&mut self, title: &str, tags: &str) -> StoreResult<Task> {
        self.store.add(title, tags)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<()> {
        self.store.update(id, patch)
    }

    /// Delete a task; if the detail view has it open, the view closes.
    pub fn delete_task(&mut self, id: &str) -> StoreResult<()> {
        self.store.delete(id)?;
        self.detail.invalidate(id);
        Ok(())
    }

    pub fn toggle_status(&mut self, id: &str) -> StoreResult<()> {
        self.store.toggle_status(id)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> StoreResult<()> {
        self.store.reorder(from, to)
    }

    pub fn reorder_by_id(&mut self, id: &str, to: usize) -> StoreResult<()> {
        self.store.reorder_by_id(id, to)
    }

    pub fn filtered_view(&self) -> Vec<Task> {
        self.store.filtered_view(&self.criteria)
    }

    /// Counts over the filtered view, recomputed on every call.
    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.filtered_view())
    }

    /// Apply a realtime snapshot from the remote subscription. Replaces the
    /// authoritative list wholesale; an open detail task that vanished from
    /// the snapshot closes the view.
    pub fn apply_snapshot(&mut self, tasks: Vec<Task>) {
        self.store.apply_snapshot(tasks);
        if let Some(id) = self.detail.open_id().cloned() {
            if self.store.get(&id).is_none() {
                self.detail.close();
            }
        }
    }

    // -- new-task form -------------------------------------------------

    pub fn draft(&self) -> &NewTaskInput {
        &self.draft
    }

    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_draft_tags(&mut self, tags: impl Into<String>) {
        self.draft.tags = tags.into();
    }

    /// Submit the new-task form. The input buffers clear on success and are
    /// kept for correction when validation rejects the title.
    pub fn submit_draft(&mut self) -> StoreResult<Task> {
        let task = self
            .store
            .add(&self.draft.title, &self.draft.tags)?;
        self.draft = NewTaskInput::default();
        Ok(task)
    }

    // -- detail view ---------------------------------------------------

    pub fn open_detail(&mut self, id: &str) -> StoreResult<()> {
        let task = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .clone();
        self.detail.open(&task);
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    pub fn detail_task(&self) -> Option<&Task> {
        self.detail.task(&self.store)
    }

    pub fn begin_edit_tags(&mut self) {
        self.detail.begin_edit_tags(&self.store);
    }

    pub fn set_detail_draft_tags(&mut self, text: impl Into<String>) {
        self.detail.set_draft_tags(text);
    }

    pub fn confirm_edit_tags(&mut self) -> StoreResult<()> {
        self.detail.confirm_edit_tags(&mut self.store)
    }

    pub fn detail_toggle_status(&mut self) -> StoreResult<()> {
        self.detail.toggle_status(&mut self.store)
    }

    pub fn detail_state(&self) -> &DetailState {
        self.detail.state()
    }
}
