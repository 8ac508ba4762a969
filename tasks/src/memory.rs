//! In-memory task store.
//!
//! Keeps insertion order, counts queries and can be told to fail, which makes
//! it the store of choice for tests and the demo binary.

use crate::error::{Result, TaskError};
use crate::store::TaskStore;
use crate::types::{NewTask, Task, TaskId};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tasklist_auth::UserId;

/// In-memory task store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<Mutex<Vec<Task>>>,
    failing: Arc<AtomicBool>,
    queries: Arc<AtomicUsize>,
}

fn lock_failed() -> TaskError {
    TaskError::Store("Mutex lock failed".to_string())
}

impl MemoryTaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent request fail with a store error.
    pub fn fail_requests(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    /// Number of requests served so far, failed ones included.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of stored tasks across all owners.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.tasks.lock().map_err(|_| lock_failed())?.len())
    }

    /// Returns `true` if no task is stored.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Store `task` as-is, bypassing id assignment.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn insert(&self, task: Task) -> Result<()> {
        self.tasks.lock().map_err(|_| lock_failed())?.push(task);
        Ok(())
    }

    fn begin(&self) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TaskError::Store("simulated store outage".to_string()));
        }
        Ok(())
    }

    fn update<F>(&self, id: &TaskId, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Task),
    {
        self.begin()?;
        let mut tasks = self.tasks.lock().map_err(|_| lock_failed())?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == *id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        apply(task);
        Ok(())
    }
}

impl TaskStore for MemoryTaskStore {
    fn create(&self, task: &NewTask) -> impl Future<Output = Result<Task>> + Send {
        let result = self.begin().and_then(|()| {
            let stored = task.clone().into_task(TaskId::generate());
            self.tasks
                .lock()
                .map_err(|_| lock_failed())?
                .push(stored.clone());
            Ok(stored)
        });

        async move { result }
    }

    fn get(&self, id: &TaskId) -> impl Future<Output = Result<Option<Task>>> + Send {
        let result = self.begin().and_then(|()| {
            Ok(self
                .tasks
                .lock()
                .map_err(|_| lock_failed())?
                .iter()
                .find(|task| task.id == *id)
                .cloned())
        });

        async move { result }
    }

    fn set_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.update(id, |task| task.completed = completed);
        async move { result }
    }

    fn set_title(&self, id: &TaskId, title: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.update(id, |task| task.title = title.to_string());
        async move { result }
    }

    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<()>> + Send {
        let result = self.begin().and_then(|()| {
            self.tasks
                .lock()
                .map_err(|_| lock_failed())?
                .retain(|task| task.id != *id);
            Ok(())
        });

        async move { result }
    }

    fn list_by_owner(&self, owner: &UserId) -> impl Future<Output = Result<Vec<Task>>> + Send {
        let result = self.begin().and_then(|()| {
            Ok(self
                .tasks
                .lock()
                .map_err(|_| lock_failed())?
                .iter()
                .filter(|task| task.owner == *owner)
                .cloned()
                .collect())
        });

        async move { result }
    }
}
