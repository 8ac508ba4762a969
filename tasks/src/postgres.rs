//! PostgreSQL task store.
//!
//! Task documents live in the `tasks` table created by the server
//! migrations. Lists are ordered by `created_at`, then by id.
//!
//! # Example
//!
//! ```no_run
//! use tasklist_tasks::PostgresTaskStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/tasklist").await?;
//! let store = PostgresTaskStore::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, TaskError};
use crate::store::TaskStore;
use crate::types::{NewTask, Task, TaskId};
use chrono::Utc;
use sqlx::PgPool;
use tasklist_auth::UserId;

/// PostgreSQL task store.
#[derive(Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Create a new PostgreSQL task store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    title: String,
    completed: bool,
    user_id: String,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId(row.id),
            title: row.title,
            completed: row.completed,
            owner: UserId(row.user_id),
        }
    }
}

fn store_error(context: &str, error: &sqlx::Error) -> TaskError {
    TaskError::Store(format!("{context}: {error}"))
}

impl TaskStore for PostgresTaskStore {
    async fn create(&self, task: &NewTask) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            INSERT INTO tasks (id, title, completed, user_id, created_at)
            VALUES ($1, $2, FALSE, $3, $4)
            RETURNING id, title, completed, user_id
            ",
        )
        .bind(TaskId::generate().as_str())
        .bind(&task.title)
        .bind(task.owner.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("Failed to insert task", &e))?;

        tracing::debug!(task_id = %row.id, user_id = %row.user_id, "Inserted task");
        Ok(row.into())
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, completed, user_id FROM tasks WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to get task", &e))?;

        Ok(row.map(Task::from))
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<()> {
        let result = sqlx::query("UPDATE tasks SET completed = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(completed)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to update task", &e))?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn set_title(&self, id: &TaskId, title: &str) -> Result<()> {
        let result = sqlx::query("UPDATE tasks SET title = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to update task", &e))?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete task", &e))?;

        Ok(())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, title, completed, user_id
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to list tasks", &e))?;

        Ok(rows.into_iter().map(Task::from).collect())
    }
}
