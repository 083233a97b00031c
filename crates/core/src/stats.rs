use serde::Serialize;

use crate::model::Task;

/// Derived counts over an ordered task sequence. Pure and recomputed on every
/// read; nothing is cached, so a stale read is impossible.
///
/// The workspace computes these over the *filtered* view so the progress
/// figures always describe the list the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.status.is_completed()).count();
        let pending = total - completed;
        let completion_rate = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            completed,
            pending,
            completion_rate,
        }
    }
}
