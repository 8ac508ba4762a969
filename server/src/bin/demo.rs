//! Tasklist Demo
//!
//! Runs the whole flow in memory, no database or Redis needed:
//! - Sign-up through Auth Actions, with the Session Store observing the provider
//! - The "Buy milk" scenario through the List View Controller
//! - Sign-out, after which the controller redirects to sign-in
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin demo
//! ```

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::mocks::{
    MockIdentityProvider, MockOAuth2Provider, MockSessionRepository, MockUserRepository,
};
use tasklist_auth::session::{self, SessionStore};
use tasklist_auth::{AuthActions, SessionConfig, SessionEnvironment, SessionState};
use tasklist_core::notify::{Notifier, TracingNotifier};
use tasklist_server::init_tracing;
use tasklist_tasks::{
    MemoryTaskStore, TaskListAction, TaskListEnvironment, TaskListStore, TaskRepository, View,
    controller::task_list_store,
};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

type Provider = MockIdentityProvider;

async fn step(
    controller: &TaskListStore<MemoryTaskStore>,
    action: TaskListAction,
) -> anyhow::Result<()> {
    controller
        .send(action)
        .await?
        .wait_with_timeout(STEP_TIMEOUT)
        .await?;
    Ok(())
}

async fn print_tasks(controller: &TaskListStore<MemoryTaskStore>) {
    let (view, tasks) = controller.state(|s| (s.view, s.tasks.clone())).await;
    println!("   view: {view:?}");
    for task in tasks {
        let mark = if task.completed { "x" } else { " " };
        println!("   [{mark}] {}", task.title);
    }
}

/// Wait until the observer has settled the session.
async fn settled(store: &SessionStore<Provider>) -> anyhow::Result<SessionState> {
    tokio::time::timeout(STEP_TIMEOUT, async {
        loop {
            let state = store.state(Clone::clone).await;
            if !state.is_loading {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .context("Session did not settle")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("\n============================================");
    println!("   Tasklist - In-Memory Demo");
    println!("============================================\n");

    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let provider = Arc::new(
        MockIdentityProvider::new(
            MockUserRepository::new(),
            MockSessionRepository::new(),
            MockOAuth2Provider::new(),
        )
        .with_session_config(SessionConfig::default().with_bcrypt_cost(4)),
    );

    let sessions = session::session_store(SessionEnvironment::new(
        Arc::clone(&provider),
        Arc::clone(&notifier),
    ));
    let observer = session::observe(&sessions);
    let actions =
        AuthActions::new(Arc::clone(&provider), Arc::clone(&notifier)).with_session(sessions.clone());

    let repository = TaskRepository::new(Arc::new(MemoryTaskStore::new()), Arc::clone(&notifier));
    let controller = task_list_store(TaskListEnvironment::new(repository));

    let mut feedback = controller.subscribe_actions();
    let feedback_log = tokio::spawn(async move {
        while let Ok(action) = feedback.recv().await {
            tracing::debug!(?action, "Controller feedback");
        }
    });

    println!("Signing up ana@example.com...");
    let credential = actions
        .sign_up("ana", "ana@example.com", "hunter22")
        .await
        .context("Sign-up failed")?;
    let session = settled(&sessions).await?;
    let Some(user) = session.current_user.clone() else {
        anyhow::bail!("Session Store has no user after sign-up");
    };
    println!(
        "   signed in as {} ({})\n",
        user.username.as_deref().unwrap_or("null"),
        user.id
    );

    step(&controller, TaskListAction::SessionChanged(session)).await?;

    println!("Adding \"Buy milk\"...");
    step(&controller, TaskListAction::DraftChanged("Buy milk".to_string())).await?;
    step(&controller, TaskListAction::AddTask).await?;
    print_tasks(&controller).await;

    let Some(id) = controller
        .state(|s| s.tasks.first().map(|task| task.id.clone()))
        .await
    else {
        anyhow::bail!("Task was not added");
    };

    println!("\nToggling it...");
    step(&controller, TaskListAction::ToggleTask(id.clone())).await?;
    print_tasks(&controller).await;

    println!("\nRenaming it to \"Buy oat milk\"...");
    step(&controller, TaskListAction::BeginEdit(id.clone())).await?;
    step(
        &controller,
        TaskListAction::EditDraftChanged("Buy oat milk".to_string()),
    )
    .await?;
    step(&controller, TaskListAction::SaveEdit).await?;
    print_tasks(&controller).await;

    println!("\nDeleting it...");
    step(&controller, TaskListAction::DeleteTask(id)).await?;
    print_tasks(&controller).await;

    println!("\nSigning out...");
    actions.sign_out(credential.session.session_id).await?;
    let session = settled(&sessions).await?;
    step(&controller, TaskListAction::SessionChanged(session)).await?;
    let view = controller.state(|s| s.view).await;
    println!("   view: {view:?}");
    if !matches!(view, View::Redirect(_)) {
        anyhow::bail!("Expected a redirect after sign-out");
    }

    observer.unsubscribe();
    controller.shutdown(STEP_TIMEOUT).await?;
    sessions.shutdown(STEP_TIMEOUT).await?;
    feedback_log.abort();
    println!("\nDemo complete.");
    Ok(())
}
