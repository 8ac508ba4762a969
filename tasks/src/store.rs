//! Document store abstraction.

use crate::error::Result;
use crate::types::{NewTask, Task, TaskId};
use std::future::Future;
use tasklist_auth::UserId;

/// Remote task document store.
///
/// Point operations address a document by id only; owner scoping is the
/// caller's job (see [`crate::repository::TaskRepository`]).
pub trait TaskStore: Send + Sync {
    /// Insert a task and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TaskError::Store`] if the store fails.
    fn create(&self, task: &NewTask) -> impl Future<Output = Result<Task>> + Send;

    /// Read one task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TaskError::Store`] if the store fails.
    fn get(&self, id: &TaskId) -> impl Future<Output = Result<Option<Task>>> + Send;

    /// Overwrite the `completed` field.
    ///
    /// # Errors
    ///
    /// - [`crate::TaskError::NotFound`] if no document has this id
    /// - [`crate::TaskError::Store`] if the store fails
    fn set_completed(&self, id: &TaskId, completed: bool)
    -> impl Future<Output = Result<()>> + Send;

    /// Overwrite the `title` field.
    ///
    /// # Errors
    ///
    /// - [`crate::TaskError::NotFound`] if no document has this id
    /// - [`crate::TaskError::Store`] if the store fails
    fn set_title(&self, id: &TaskId, title: &str) -> impl Future<Output = Result<()>> + Send;

    /// Remove a task. Deleting a missing document is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TaskError::Store`] if the store fails.
    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<()>> + Send;

    /// Every task owned by `owner`, in store order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TaskError::Store`] if the store fails.
    fn list_by_owner(&self, owner: &UserId) -> impl Future<Output = Result<Vec<Task>>> + Send;
}
