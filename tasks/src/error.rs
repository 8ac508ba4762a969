//! Task errors.

use crate::types::TaskId;
use thiserror::Error;

/// Result type alias for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Notice shown for any store failure.
pub const FAILURE_NOTICE: &str = "something went wrong";

/// Notice shown when a task does not exist for the current user.
pub const NOT_FOUND_NOTICE: &str = "no such document";

/// Task store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// No task with this id belongs to the current user.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The document store failed.
    #[error("task store error: {0}")]
    Store(String),
}

impl TaskError {
    /// Text shown to the user for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => NOT_FOUND_NOTICE,
            Self::Store(_) => FAILURE_NOTICE,
        }
    }
}
