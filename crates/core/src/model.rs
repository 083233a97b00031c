use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Opaque task identifier. Local storage issues sequential integers rendered
/// as strings; the remote backend issues its own opaque document ids. Never
/// assume numeric ordering carries meaning.
pub type TaskId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Incomplete,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Incomplete => "incomplete",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Incomplete => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Incomplete,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incomplete" | "active" | "open" | "pending" => Ok(TaskStatus::Incomplete),
            "completed" | "complete" | "done" => Ok(TaskStatus::Completed),
            other => Err(anyhow!(
                "Unknown status '{}': expected incomplete|completed",
                other
            )),
        }
    }
}

impl ValueEnum for TaskStatus {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [TaskStatus; 2] = [TaskStatus::Incomplete, TaskStatus::Completed];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// A single todo entry. `tags` is free text (comma-or-space separated labels);
/// tag filtering is a raw substring match, so no structure is enforced here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub tags: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update merged into an existing task. Absent fields are left as-is;
/// present fields replace the stored value wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn tags(value: impl Into<String>) -> Self {
        Self {
            tags: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn status(value: TaskStatus) -> Self {
        Self {
            status: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.tags.is_none() && self.status.is_none()
    }

    /// Merge into `task`, trimming text fields. Does not touch timestamps;
    /// the store stamps `updated_at` when it commits.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.trim().to_string();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// The three independent list predicates. Each one is skipped when empty, so
/// the default criteria pass every task through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub tag: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.status.is_none() && self.tag.trim().is_empty()
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn clear_tag(&mut self) {
        self.tag.clear();
    }

    pub fn clear_all(&mut self) {
        self.clear_search();
        self.clear_status();
        self.clear_tag();
    }

    /// Predicates applied in order: title substring (case-insensitive),
    /// exact status, tag substring (case-insensitive).
    pub fn matches(&self, task: &Task) -> bool {
        let search = self.search.trim();
        if !search.is_empty() && !task.title.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }

        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }

        let tag = self.tag.trim();
        if !tag.is_empty() && !task.tags.to_lowercase().contains(&tag.to_lowercase()) {
            return false;
        }

        true
    }
}
