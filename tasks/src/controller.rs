//! List View Controller.
//!
//! Reconciles [`TaskRepository`] results into local list state. The view
//! follows the session:
//!
//! ```text
//! session loading          → View::Loading
//! resolved, no user        → View::Redirect(Route::SignIn)   (no store query)
//! resolved, user present   → View::Ready + list(owner)
//! ```
//!
//! Mutations never touch `tasks` directly; the list is replaced by the
//! re-fetch each repository call returns.

use crate::repository::TaskRepository;
use crate::store::TaskStore;
use crate::types::{Task, TaskId};
use std::marker::PhantomData;
use tasklist_auth::{SessionState, UserId};
use tasklist_core::effect::Effect;
use tasklist_core::reducer::Reducer;
use tasklist_core::{SmallVec, smallvec};
use tasklist_runtime::Store;

/// Store running the List View Controller.
pub type TaskListStore<S> =
    Store<TaskListState, TaskListAction, TaskListEnvironment<S>, TaskListReducer<S>>;

/// Places the controller can send the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The sign-in page.
    SignIn,
}

impl Route {
    /// URL path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/sign-in",
        }
    }
}

/// What the list page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Waiting for the session to resolve.
    #[default]
    Loading,
    /// Send the visitor elsewhere.
    Redirect(Route),
    /// Show the task list.
    Ready,
}

/// A task being renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editing {
    /// Task being renamed.
    pub id: TaskId,
    /// Title typed so far.
    pub draft: String,
}

/// Local state of the list page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskListState {
    /// New-task input.
    pub draft: String,
    /// Last list fetched for `owner`.
    pub tasks: Vec<Task>,
    /// Rename in progress, if any.
    pub editing: Option<Editing>,
    /// Current view.
    pub view: View,
    /// User the list belongs to.
    pub owner: Option<UserId>,
}

/// Inputs of the List View Controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListAction {
    /// The Session Store changed.
    SessionChanged(SessionState),
    /// Re-fetch the owner's list.
    Refresh,
    /// A list fetch finished.
    Loaded(Vec<Task>),
    /// The new-task input changed.
    DraftChanged(String),
    /// Add the draft as a task.
    AddTask,
    /// Flip a task's completion.
    ToggleTask(TaskId),
    /// Start renaming a task.
    BeginEdit(TaskId),
    /// The rename input changed.
    EditDraftChanged(String),
    /// Save the rename.
    SaveEdit,
    /// Abandon the rename.
    CancelEdit,
    /// Delete a task.
    DeleteTask(TaskId),
    /// A mutation finished; `Some` carries the re-fetched list.
    Mutated(Option<Vec<Task>>),
}

/// Dependencies of the List View Controller.
pub struct TaskListEnvironment<S> {
    /// Owner-scoped task operations.
    pub repository: TaskRepository<S>,
}

impl<S> TaskListEnvironment<S> {
    /// Create a new environment.
    #[must_use]
    pub const fn new(repository: TaskRepository<S>) -> Self {
        Self { repository }
    }
}

impl<S> Clone for TaskListEnvironment<S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

/// Reducer behind the List View Controller.
pub struct TaskListReducer<S> {
    _store: PhantomData<fn() -> S>,
}

impl<S> TaskListReducer<S> {
    /// Create a new reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _store: PhantomData,
        }
    }
}

impl<S> Default for TaskListReducer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for TaskListReducer<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Effect that runs one repository mutation and feeds back its result.
fn mutation<S, F, Fut>(env: &TaskListEnvironment<S>, run: F) -> Effect<TaskListAction>
where
    S: TaskStore + 'static,
    F: FnOnce(TaskRepository<S>) -> Fut,
    Fut: std::future::Future<Output = Option<Vec<Task>>> + Send + 'static,
{
    let fut = run(env.repository.clone());
    Effect::future(async move { Some(TaskListAction::Mutated(fut.await)) })
}

fn fetch<S>(env: &TaskListEnvironment<S>, owner: UserId) -> Effect<TaskListAction>
where
    S: TaskStore + 'static,
{
    let repository = env.repository.clone();
    Effect::future(async move { Some(TaskListAction::Loaded(repository.list(&owner).await)) })
}

impl<S> Reducer for TaskListReducer<S>
where
    S: TaskStore + 'static,
{
    type State = TaskListState;
    type Action = TaskListAction;
    type Environment = TaskListEnvironment<S>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TaskListAction::SessionChanged(session) => {
                if session.is_loading {
                    state.view = View::Loading;
                    return smallvec![Effect::None];
                }

                let Some(user) = session.current_user else {
                    tracing::debug!("Anonymous visitor, redirecting to sign-in");
                    state.view = View::Redirect(Route::SignIn);
                    state.owner = None;
                    state.tasks.clear();
                    state.editing = None;
                    return smallvec![Effect::None];
                };

                if state.owner.as_ref() != Some(&user.id) {
                    state.tasks.clear();
                    state.editing = None;
                }
                state.owner = Some(user.id.clone());
                state.view = View::Ready;

                smallvec![fetch(env, user.id)]
            },

            TaskListAction::Refresh => match state.owner.clone() {
                Some(owner) => smallvec![fetch(env, owner)],
                None => smallvec![Effect::None],
            },

            TaskListAction::Loaded(tasks) | TaskListAction::Mutated(Some(tasks)) => {
                state.tasks = tasks;
                smallvec![Effect::None]
            },

            TaskListAction::Mutated(None) => smallvec![Effect::None],

            TaskListAction::DraftChanged(text) => {
                state.draft = text;
                smallvec![Effect::None]
            },

            TaskListAction::AddTask => {
                let Some(owner) = state.owner.clone() else {
                    return smallvec![Effect::None];
                };
                if state.draft.trim().is_empty() {
                    return smallvec![Effect::None];
                }

                let title = std::mem::take(&mut state.draft);
                smallvec![mutation(env, move |repository| async move {
                    repository.add(Some(&owner), &title).await
                })]
            },

            TaskListAction::ToggleTask(id) => {
                let Some(owner) = state.owner.clone() else {
                    return smallvec![Effect::None];
                };

                smallvec![mutation(env, move |repository| async move {
                    repository.toggle_complete(&owner, &id).await
                })]
            },

            TaskListAction::BeginEdit(id) => {
                if let Some(task) = state.tasks.iter().find(|task| task.id == id) {
                    state.editing = Some(Editing {
                        id,
                        draft: task.title.clone(),
                    });
                }
                smallvec![Effect::None]
            },

            TaskListAction::EditDraftChanged(text) => {
                if let Some(editing) = state.editing.as_mut() {
                    editing.draft = text;
                }
                smallvec![Effect::None]
            },

            TaskListAction::SaveEdit => {
                let (Some(owner), Some(editing)) = (state.owner.clone(), state.editing.take())
                else {
                    return smallvec![Effect::None];
                };

                smallvec![mutation(env, move |repository| async move {
                    repository
                        .update_title(&owner, &editing.id, &editing.draft)
                        .await
                })]
            },

            TaskListAction::CancelEdit => {
                state.editing = None;
                smallvec![Effect::None]
            },

            TaskListAction::DeleteTask(id) => {
                let Some(owner) = state.owner.clone() else {
                    return smallvec![Effect::None];
                };
                if state.editing.as_ref().is_some_and(|editing| editing.id == id) {
                    state.editing = None;
                }

                smallvec![mutation(env, move |repository| async move {
                    repository.delete(&owner, &id).await
                })]
            },
        }
    }
}

/// Create a List View Controller store in the loading view.
#[must_use]
pub fn task_list_store<S>(environment: TaskListEnvironment<S>) -> TaskListStore<S>
where
    S: TaskStore + 'static,
{
    Store::new(
        TaskListState::default(),
        TaskListReducer::new(),
        environment,
    )
}
