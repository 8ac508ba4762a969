//! Task documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use tasklist_auth::UserId;

/// Store-assigned task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored task.
///
/// `owner` is the identifier of the user the task belongs to; every read is
/// filtered by it and every write is tagged with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Title as entered.
    pub title: String,
    /// Whether the task is done.
    pub completed: bool,
    /// Owning user.
    pub owner: UserId,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Title as entered.
    pub title: String,
    /// Owning user.
    pub owner: UserId,
}

impl NewTask {
    /// A not-yet-completed task for `owner`.
    #[must_use]
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            owner,
        }
    }

    /// The stored form under `id`.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            completed: false,
            owner: self.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_incomplete() {
        let task = NewTask::new(UserId::new("u1"), "Buy milk").into_task(TaskId::new("t1"));
        assert!(!task.completed);
        assert_eq!(task.owner, UserId::new("u1"));
        assert_eq!(task.id.to_string(), "t1");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }
}
