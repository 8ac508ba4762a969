//! List View Controller driven through a runtime store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::{SessionId, SessionState, User, UserId};
use tasklist_core::notify::RecordingNotifier;
use tasklist_tasks::controller::task_list_store;
use tasklist_tasks::error::NOT_FOUND_NOTICE;
use tasklist_tasks::{
    MemoryTaskStore, Route, TaskId, TaskListAction, TaskListEnvironment, TaskListState,
    TaskListStore, TaskRepository, View,
};

const TIMEOUT: Duration = Duration::from_secs(2);

fn controller() -> (TaskListStore<MemoryTaskStore>, MemoryTaskStore, RecordingNotifier) {
    let store = MemoryTaskStore::new();
    let notifier = RecordingNotifier::new();
    let repository = TaskRepository::new(Arc::new(store.clone()), Arc::new(notifier.clone()));
    (
        task_list_store(TaskListEnvironment::new(repository)),
        store,
        notifier,
    )
}

fn signed_in(id: &str) -> SessionState {
    SessionState::authenticated(
        SessionId::new(),
        User {
            id: UserId::new(id),
            email: None,
            username: Some(id.to_string()),
        },
    )
}

async fn dispatch(controller: &TaskListStore<MemoryTaskStore>, action: TaskListAction) -> TaskListState {
    let mut handle = controller.send(action).await.unwrap();
    handle.wait_with_timeout(TIMEOUT).await.unwrap();
    controller.state(Clone::clone).await
}

#[tokio::test]
async fn buy_milk_scenario() {
    let (controller, _, notifier) = controller();

    dispatch(&controller, TaskListAction::SessionChanged(signed_in("ana"))).await;
    dispatch(&controller, TaskListAction::DraftChanged("Buy milk".to_string())).await;
    let state = dispatch(&controller, TaskListAction::AddTask).await;

    assert!(state.draft.is_empty());
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].title, "Buy milk");
    assert!(!state.tasks[0].completed);
    let id = state.tasks[0].id.clone();

    let state = dispatch(&controller, TaskListAction::ToggleTask(id.clone())).await;
    assert!(state.tasks[0].completed);

    dispatch(&controller, TaskListAction::BeginEdit(id.clone())).await;
    dispatch(
        &controller,
        TaskListAction::EditDraftChanged("Buy oat milk".to_string()),
    )
    .await;
    let state = dispatch(&controller, TaskListAction::SaveEdit).await;

    assert!(state.editing.is_none());
    assert_eq!(state.tasks[0].title, "Buy oat milk");
    assert!(state.tasks[0].completed);

    let state = dispatch(&controller, TaskListAction::DeleteTask(id)).await;
    assert!(state.tasks.is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn anonymous_visitor_is_redirected_before_any_query() {
    let (controller, store, _) = controller();

    let state = dispatch(&controller, TaskListAction::SessionChanged(SessionState::default())).await;
    assert_eq!(state.view, View::Loading);

    let state = dispatch(
        &controller,
        TaskListAction::SessionChanged(SessionState::anonymous()),
    )
    .await;

    assert_eq!(state.view, View::Redirect(Route::SignIn));
    assert_eq!(Route::SignIn.path(), "/sign-in");
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn lists_are_scoped_to_the_signed_in_user() {
    let (controller, _, notifier) = controller();

    dispatch(&controller, TaskListAction::SessionChanged(signed_in("ana"))).await;
    dispatch(&controller, TaskListAction::DraftChanged("ana's task".to_string())).await;
    let state = dispatch(&controller, TaskListAction::AddTask).await;
    let anas_task = state.tasks[0].id.clone();

    let state = dispatch(&controller, TaskListAction::SessionChanged(signed_in("bo"))).await;
    assert!(state.tasks.is_empty());

    // bo cannot reach ana's task by id
    let state = dispatch(&controller, TaskListAction::DeleteTask(anas_task)).await;
    assert!(state.tasks.is_empty());
    assert_eq!(notifier.messages(), vec![NOT_FOUND_NOTICE]);

    let state = dispatch(&controller, TaskListAction::SessionChanged(signed_in("ana"))).await;
    assert_eq!(state.tasks.len(), 1);
}

#[tokio::test]
async fn toggling_unknown_task_reports_no_such_document() {
    let (controller, _, notifier) = controller();

    dispatch(&controller, TaskListAction::SessionChanged(signed_in("ana"))).await;
    dispatch(&controller, TaskListAction::ToggleTask(TaskId::new("missing"))).await;

    assert_eq!(notifier.messages(), vec![NOT_FOUND_NOTICE]);
}
