use thiserror::Error;

use crate::model::TaskId;

/// Typed failures for store and port operations. Validation errors reject the
/// operation before any state change; persistence and auth failures are also
/// recorded in the store's last-error slot so a UI can surface them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("no task with id '{0}'")]
    NotFound(TaskId),
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("task '{0}' belongs to another user")]
    PermissionDenied(TaskId),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("malformed stored data: {0}")]
    MalformedData(String),
}

impl StoreError {
    /// Whether the failure came from the persistence or auth layer rather
    /// than local validation.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            StoreError::NotAuthenticated
                | StoreError::PermissionDenied(_)
                | StoreError::Persistence(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
