//! Task list endpoints.
//!
//! Every request runs a fresh List View Controller: the session is fed in
//! first, and an anonymous visitor is redirected to sign-in before the task
//! store is queried. The remaining actions run only for a signed-in user,
//! and the controller is shut down before the response is written.
//!
//! Responses carry the re-fetched list and the notices the request produced:
//!
//! ```json
//! { "tasks": [{ "id": "…", "title": "Buy milk", "completed": false }], "notices": [] }
//! ```

use super::resolve_session;
use crate::error::AppError;
use crate::extractors::SessionToken;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::providers::IdentityProvider;
use tasklist_core::notify::{Notifier, RecordingNotifier};
use tasklist_tasks::controller::task_list_store;
use tasklist_tasks::error::NOT_FOUND_NOTICE;
use tasklist_tasks::{
    Task, TaskId, TaskListAction, TaskListEnvironment, TaskListState, TaskListStore,
    TaskRepository, TaskStore, View,
};

/// How long one controller action may take, re-fetch included.
const ACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Task as returned to clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskBody {
    /// Task identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Whether the task is done.
    pub completed: bool,
}

impl From<Task> for TaskBody {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.0,
            title: task.title,
            completed: task.completed,
        }
    }
}

/// Task list response.
#[derive(Debug, Serialize)]
pub struct TaskListBody {
    /// The owner's tasks, in store order.
    pub tasks: Vec<TaskBody>,
    /// User-visible notifications, in order.
    pub notices: Vec<String>,
}

/// New task or new title.
#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    /// Task title.
    #[serde(default)]
    pub title: String,
}

async fn dispatch<S>(store: &TaskListStore<S>, action: TaskListAction) -> Result<(), AppError>
where
    S: TaskStore + 'static,
{
    let mut handle = store.send(action).await?;
    handle.wait_with_timeout(ACTION_TIMEOUT).await?;
    Ok(())
}

/// Run the controller for one request.
///
/// `plan` sees the state after the initial list fetch and returns the
/// actions to apply.
async fn run<P, S, F>(
    state: &AppState<P, S>,
    token: Option<tasklist_auth::SessionId>,
    plan: F,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
    F: FnOnce(&TaskListState, &dyn Notifier) -> Vec<TaskListAction>,
{
    let session = resolve_session(state.provider.as_ref(), token).await?;

    let notifier = RecordingNotifier::new();
    let repository = TaskRepository::new(Arc::clone(&state.tasks), Arc::new(notifier.clone()));
    let controller = task_list_store(TaskListEnvironment::new(repository));

    dispatch(&controller, TaskListAction::SessionChanged(session)).await?;

    let page = controller.state(Clone::clone).await;
    if let View::Redirect(route) = page.view {
        return Ok(Redirect::to(route.path()).into_response());
    }

    for action in plan(&page, &notifier) {
        dispatch(&controller, action).await?;
    }

    let tasks = controller.state(|s| s.tasks.clone()).await;
    controller.shutdown(ACTION_TIMEOUT).await?;
    Ok(Json(TaskListBody {
        tasks: tasks.into_iter().map(TaskBody::from).collect(),
        notices: notifier.take(),
    })
    .into_response())
}

/// `GET /` and `GET /tasks`
///
/// # Errors
///
/// Returns [`AppError`] if the session cannot be resolved or the controller
/// times out.
pub async fn list<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    run(&state, token, |_, _| Vec::new()).await
}

/// `POST /tasks`
///
/// A blank title is ignored.
///
/// # Errors
///
/// See [`list`].
pub async fn create<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
    Json(request): Json<TitleRequest>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    run(&state, token, move |_, _| {
        vec![
            TaskListAction::DraftChanged(request.title),
            TaskListAction::AddTask,
        ]
    })
    .await
}

/// `POST /tasks/:id/toggle`
///
/// # Errors
///
/// See [`list`].
pub async fn toggle<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    run(&state, token, move |_, _| {
        vec![TaskListAction::ToggleTask(TaskId(id))]
    })
    .await
}

/// `PUT /tasks/:id`
///
/// Renames through the controller's edit flow. A task not in the user's list
/// reports "no such document".
///
/// # Errors
///
/// See [`list`].
pub async fn rename<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
    Json(request): Json<TitleRequest>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let id = TaskId(id);
    run(&state, token, move |page, notifier| {
        if !page.tasks.iter().any(|task| task.id == id) {
            notifier.notify(NOT_FOUND_NOTICE);
            return Vec::new();
        }
        vec![
            TaskListAction::BeginEdit(id),
            TaskListAction::EditDraftChanged(request.title),
            TaskListAction::SaveEdit,
        ]
    })
    .await
}

/// `DELETE /tasks/:id`
///
/// # Errors
///
/// See [`list`].
pub async fn delete<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    run(&state, token, move |_, _| {
        vec![TaskListAction::DeleteTask(TaskId(id))]
    })
    .await
}
