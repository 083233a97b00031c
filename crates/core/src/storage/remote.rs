use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::auth::{AuthPort, UserId};
use crate::error::{StoreError, StoreResult};
use crate::model::{Task, TaskId, TaskStatus};
use crate::storage::PersistencePort;

/// One task document as the remote side stores it: the task fields plus the
/// owning user, an explicit position so list order survives reloads, and
/// server-side timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDocument {
    pub id: TaskId,
    pub owner: UserId,
    pub title: String,
    pub tags: String,
    pub status: TaskStatus,
    pub position: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDocument {
    fn to_task(&self) -> Task {
        Task {
            id: self.id.clone(),
            title: self.title.clone(),
            tags: self.tags.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

struct SnapshotListener {
    token: u64,
    owner: UserId,
    callback: Rc<dyn Fn(Vec<Task>)>,
}

/// Realtime subscription handle. Dropping it releases the callback, so a
/// torn-down view cannot keep receiving snapshots.
pub struct Subscription {
    listeners: Weak<RefCell<Vec<SnapshotListener>>>,
    token: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|l| l.token != self.token);
            tracing::debug!(token = self.token, "released task subscription");
        }
    }
}

/// In-process document store standing in for the hosted document database:
/// per-user task documents plus subscriptions that receive the owner's full
/// task set on every change.
pub struct RemoteBackend {
    documents: Vec<TaskDocument>,
    listeners: Rc<RefCell<Vec<SnapshotListener>>>,
    next_token: u64,
}

pub type SharedBackend = Rc<RefCell<RemoteBackend>>;

impl Default for RemoteBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteBackend {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_token: 0,
        }
    }

    pub fn shared() -> SharedBackend {
        Rc::new(RefCell::new(Self::new()))
    }

    /// The given user's tasks in persisted position order.
    pub fn tasks_for(&self, owner: &str) -> Vec<Task> {
        let mut docs: Vec<&TaskDocument> =
            self.documents.iter().filter(|d| d.owner == owner).collect();
        docs.sort_by_key(|d| d.position);
        docs.into_iter().map(TaskDocument::to_task).collect()
    }

    pub fn document(&self, id: &str) -> Option<&TaskDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    fn document_mut(&mut self, id: &str) -> Option<&mut TaskDocument> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    pub fn subscribe(&mut self, owner: &str, callback: Rc<dyn Fn(Vec<Task>)>) -> Subscription {
        self.next_token += 1;
        let token = self.next_token;
        self.listeners.borrow_mut().push(SnapshotListener {
            token,
            owner: owner.to_string(),
            callback,
        });
        tracing::debug!(token, owner, "opened task subscription");
        Subscription {
            listeners: Rc::downgrade(&self.listeners),
            token,
        }
    }

    fn callbacks_for(&self, owner: &str) -> Vec<Rc<dyn Fn(Vec<Task>)>> {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.owner == owner)
            .map(|l| Rc::clone(&l.callback))
            .collect()
    }
}

/// Fan the owner's current snapshot out to subscribers. Callbacks run with no
/// borrow held so they may re-enter the backend.
fn publish(backend: &SharedBackend, owner: &str) {
    let (callbacks, tasks) = {
        let backend = backend.borrow();
        (backend.callbacks_for(owner), backend.tasks_for(owner))
    };
    for callback in callbacks {
        callback(tasks.clone());
    }
}

/// Persistence adapter for the remote document backend. Every mutating call
/// requires a signed-in user and, for update/delete, ownership of the
/// document; the check happens before anything is written.
pub struct RemotePort {
    backend: SharedBackend,
    auth: Rc<RefCell<dyn AuthPort>>,
}

impl RemotePort {
    pub fn new(backend: SharedBackend, auth: Rc<RefCell<dyn AuthPort>>) -> Self {
        Self { backend, auth }
    }

    fn current_uid(&self) -> StoreResult<UserId> {
        self.auth
            .borrow()
            .current_user()
            .map(|u| u.uid)
            .ok_or(StoreError::NotAuthenticated)
    }

    fn check_owned(&self, id: &str, uid: &str) -> StoreResult<()> {
        let backend = self.backend.borrow();
        let doc = backend
            .document(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if doc.owner != uid {
            return Err(StoreError::PermissionDenied(id.to_string()));
        }
        Ok(())
    }

    /// Rewrite persisted positions to match `next` order.
    fn write_positions(&self, next: &[Task]) {
        let mut backend = self.backend.borrow_mut();
        for (position, task) in next.iter().enumerate() {
            if let Some(doc) = backend.document_mut(&task.id) {
                doc.position = position;
            }
        }
    }
}

impl PersistencePort for RemotePort {
    fn load(&mut self) -> StoreResult<Vec<Task>> {
        let uid = self.current_uid()?;
        Ok(self.backend.borrow().tasks_for(&uid))
    }

    fn issue_id(&mut self, _existing: &[Task]) -> StoreResult<TaskId> {
        self.current_uid()?;
        Ok(Ulid::new().to_string())
    }

    fn commit_create(&mut self, created: &Task, next: &[Task]) -> StoreResult<()> {
        let uid = self.current_uid()?;
        let now = Utc::now();
        {
            let mut backend = self.backend.borrow_mut();
            backend.documents.push(TaskDocument {
                id: created.id.clone(),
                owner: uid.clone(),
                title: created.title.clone(),
                tags: created.tags.clone(),
                status: created.status,
                position: next.len().saturating_sub(1),
                created_at: now,
                updated_at: now,
            });
        }
        publish(&self.backend, &uid);
        Ok(())
    }

    fn commit_update(&mut self, updated: &Task, _next: &[Task]) -> StoreResult<()> {
        let uid = self.current_uid()?;
        self.check_owned(&updated.id, &uid)?;
        {
            let mut backend = self.backend.borrow_mut();
            let doc = backend
                .document_mut(&updated.id)
                .ok_or_else(|| StoreError::NotFound(updated.id.clone()))?;
            doc.title = updated.title.clone();
            doc.tags = updated.tags.clone();
            doc.status = updated.status;
            doc.updated_at = Utc::now();
        }
        publish(&self.backend, &uid);
        Ok(())
    }

    fn commit_delete(&mut self, id: &TaskId, next: &[Task]) -> StoreResult<()> {
        let uid = self.current_uid()?;
        self.check_owned(id, &uid)?;
        self.backend.borrow_mut().documents.retain(|d| &d.id != id);
        self.write_positions(next);
        publish(&self.backend, &uid);
        Ok(())
    }

    fn commit_reorder(&mut self, next: &[Task]) -> StoreResult<()> {
        let uid = self.current_uid()?;
        for task in next {
            self.check_owned(&task.id, &uid)?;
        }
        self.write_positions(next);
        publish(&self.backend, &uid);
        Ok(())
    }
}
