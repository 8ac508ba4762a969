//! Task Repository.
//!
//! Owner-scoped task operations. Every call catches its own failures: they
//! are logged and reported through the [`Notifier`], and the caller gets back
//! an empty list or `None` instead of an error.
//!
//! Mutations return `Some(tasks)`, the owner's freshly re-fetched list, when
//! the mutation was applied, and `None` when it was skipped or failed.

use crate::error::{NOT_FOUND_NOTICE, TaskError};
use crate::store::TaskStore;
use crate::types::{NewTask, Task, TaskId};
use std::sync::Arc;
use tasklist_auth::UserId;
use tasklist_core::notify::Notifier;

/// Task Repository over a [`TaskStore`].
pub struct TaskRepository<S> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
}

impl<S> Clone for TaskRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S: TaskStore> TaskRepository<S> {
    /// Create a repository that reports to `notifier`.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The same repository reporting to a different notifier.
    #[must_use]
    pub fn with_notifier(&self, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier,
        }
    }

    /// All tasks owned by `owner`, in store order.
    ///
    /// On failure the error is reported and the list is empty.
    #[tracing::instrument(skip(self, owner), fields(user_id = %owner))]
    pub async fn list(&self, owner: &UserId) -> Vec<Task> {
        match self.store.list_by_owner(owner).await {
            Ok(tasks) => tasks
                .into_iter()
                .filter(|task| task.owner == *owner)
                .collect(),
            Err(error) => {
                self.report("Failed to list tasks", &error);
                Vec::new()
            },
        }
    }

    /// Insert `title` for `owner`, then re-list.
    ///
    /// Skipped when there is no owner or the title is blank.
    pub async fn add(&self, owner: Option<&UserId>, title: &str) -> Option<Vec<Task>> {
        let owner = owner?;
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        match self.store.create(&NewTask::new(owner.clone(), title)).await {
            Ok(task) => {
                tracing::info!(task_id = %task.id, user_id = %owner, "Added task");
                Some(self.list(owner).await)
            },
            Err(error) => {
                self.report("Failed to add task", &error);
                None
            },
        }
    }

    /// Flip `completed` on one of `owner`'s tasks, then re-list.
    pub async fn toggle_complete(&self, owner: &UserId, id: &TaskId) -> Option<Vec<Task>> {
        let task = self.owned(owner, id).await?;

        match self.store.set_completed(id, !task.completed).await {
            Ok(()) => {
                tracing::debug!(task_id = %id, completed = !task.completed, "Toggled task");
                Some(self.list(owner).await)
            },
            Err(error) => {
                self.report("Failed to toggle task", &error);
                None
            },
        }
    }

    /// Replace the title of one of `owner`'s tasks, then re-list.
    ///
    /// A blank title is ignored.
    pub async fn update_title(
        &self,
        owner: &UserId,
        id: &TaskId,
        title: &str,
    ) -> Option<Vec<Task>> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        self.owned(owner, id).await?;

        match self.store.set_title(id, title).await {
            Ok(()) => {
                tracing::debug!(task_id = %id, "Renamed task");
                Some(self.list(owner).await)
            },
            Err(error) => {
                self.report("Failed to update task", &error);
                None
            },
        }
    }

    /// Remove one of `owner`'s tasks, then re-list.
    pub async fn delete(&self, owner: &UserId, id: &TaskId) -> Option<Vec<Task>> {
        self.owned(owner, id).await?;

        match self.store.delete(id).await {
            Ok(()) => {
                tracing::info!(task_id = %id, user_id = %owner, "Deleted task");
                Some(self.list(owner).await)
            },
            Err(error) => {
                self.report("Failed to delete task", &error);
                None
            },
        }
    }

    /// Read `id`, treating a task owned by someone else as absent.
    async fn owned(&self, owner: &UserId, id: &TaskId) -> Option<Task> {
        match self.store.get(id).await {
            Ok(Some(task)) if task.owner == *owner => Some(task),
            Ok(_) => {
                tracing::warn!(task_id = %id, user_id = %owner, "No such task for user");
                self.notifier.notify(NOT_FOUND_NOTICE);
                None
            },
            Err(error) => {
                self.report("Failed to read task", &error);
                None
            },
        }
    }

    fn report(&self, context: &str, error: &TaskError) {
        tracing::error!(%error, "{context}");
        self.notifier.notify(error.user_message());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FAILURE_NOTICE;
    use crate::memory::MemoryTaskStore;
    use tasklist_core::notify::RecordingNotifier;

    fn repository() -> (TaskRepository<MemoryTaskStore>, MemoryTaskStore, RecordingNotifier) {
        let store = MemoryTaskStore::new();
        let notifier = RecordingNotifier::new();
        (
            TaskRepository::new(Arc::new(store.clone()), Arc::new(notifier.clone())),
            store,
            notifier,
        )
    }

    fn task(id: &str, owner: &str, title: &str) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.to_string(),
            completed: false,
            owner: UserId::new(owner),
        }
    }

    #[tokio::test]
    async fn add_then_list_includes_incomplete_task() {
        let (repo, _, notifier) = repository();
        let ana = UserId::new("ana");

        let tasks = repo.add(Some(&ana), "Buy milk").await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert!(!tasks[0].completed);
        assert_eq!(repo.list(&ana).await, tasks);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn blank_title_or_missing_owner_is_skipped() {
        let (repo, store, _) = repository();

        assert!(repo.add(Some(&UserId::new("ana")), "   ").await.is_none());
        assert!(repo.add(None, "Buy milk").await.is_none());
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn foreign_task_is_no_such_document() {
        let (repo, store, notifier) = repository();
        store.insert(task("t1", "bo", "theirs")).unwrap();

        let result = repo.toggle_complete(&UserId::new("ana"), &TaskId::new("t1")).await;

        assert!(result.is_none());
        assert_eq!(notifier.messages(), vec![NOT_FOUND_NOTICE]);
        let stored = store.get(&TaskId::new("t1")).await.unwrap().unwrap();
        assert!(!stored.completed);
    }

    #[tokio::test]
    async fn missing_task_is_no_such_document() {
        let (repo, _, notifier) = repository();

        let result = repo.delete(&UserId::new("ana"), &TaskId::new("nope")).await;

        assert!(result.is_none());
        assert_eq!(notifier.messages(), vec![NOT_FOUND_NOTICE]);
    }

    #[tokio::test]
    async fn list_failure_is_empty_with_generic_notice() {
        let (repo, store, notifier) = repository();
        store.insert(task("t1", "ana", "Buy milk")).unwrap();
        store.fail_requests(true);

        assert!(repo.list(&UserId::new("ana")).await.is_empty());
        assert_eq!(notifier.messages(), vec![FAILURE_NOTICE]);
    }

    #[tokio::test]
    async fn update_title_keeps_completion() {
        let (repo, _, _) = repository();
        let ana = UserId::new("ana");
        let id = repo.add(Some(&ana), "Buy milk").await.unwrap()[0].id.clone();
        repo.toggle_complete(&ana, &id).await.unwrap();

        let tasks = repo.update_title(&ana, &id, "Buy oat milk").await.unwrap();

        assert_eq!(tasks[0].title, "Buy oat milk");
        assert!(tasks[0].completed);
    }

    #[tokio::test]
    async fn blank_rename_is_ignored() {
        let (repo, store, notifier) = repository();
        let ana = UserId::new("ana");
        let id = repo.add(Some(&ana), "Buy milk").await.unwrap()[0].id.clone();
        let before = store.query_count();

        assert!(repo.update_title(&ana, &id, "").await.is_none());
        assert_eq!(store.query_count(), before);
        assert!(notifier.messages().is_empty());
    }
}
