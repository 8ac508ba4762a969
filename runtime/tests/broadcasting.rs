//! Integration tests for Store action broadcasting
//!
//! Request handlers and observers watch the actions effects feed back into
//! the store; these tests pin down what they can rely on.

#![allow(clippy::unwrap_used)]

use std::time::Duration;
use tasklist_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use tasklist_runtime::{Store, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchAction {
    /// Start a fetch for `id`
    Fetch { id: u64 },
    /// Fetch finished
    Fetched { id: u64, items: u32 },
    /// Local edit, no effects
    Rename(String),
}

#[derive(Debug, Clone, Default)]
struct FetchState {
    fetched: Vec<u64>,
    name: String,
}

#[derive(Clone)]
struct FetchReducer;

impl Reducer for FetchReducer {
    type State = FetchState;
    type Action = FetchAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FetchAction::Fetch { id } => smallvec![Effect::future(async move {
                tokio::time::sleep(Duration::from_millis(5 * (id % 3))).await;
                Some(FetchAction::Fetched { id, items: 2 })
            })],
            FetchAction::Fetched { id, .. } => {
                state.fetched.push(id);
                smallvec![Effect::None]
            },
            FetchAction::Rename(name) => {
                state.name = name;
                smallvec![Effect::None]
            },
        }
    }
}

fn store() -> Store<FetchState, FetchAction, (), FetchReducer> {
    Store::new(FetchState::default(), FetchReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn subscribers_see_effect_output() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store
        .send(FetchAction::Fetch { id: 7 })
        .await
        .unwrap()
        .wait()
        .await;

    assert_eq!(rx.recv().await.unwrap(), FetchAction::Fetched { id: 7, items: 2 });
}

#[tokio::test]
async fn directly_sent_actions_are_not_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store
        .send(FetchAction::Rename("groceries".to_string()))
        .await
        .unwrap();

    assert!(rx.try_recv().is_err());
    assert_eq!(store.state(|s| s.name.clone()).await, "groceries");
}

#[tokio::test]
async fn concurrent_senders_each_wait_for_their_own_fetch() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let mut handles = Vec::new();
    for id in 1..=5 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut handle = store.send(FetchAction::Fetch { id }).await.unwrap();
            handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
            store.state(|s| s.fetched.contains(&id)).await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap());
    }

    let mut seen = Vec::new();
    while let Ok(FetchAction::Fetched { id, .. }) = rx.try_recv() {
        seen.push(id);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn shutdown_waits_for_running_effects() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(FetchAction::Fetch { id: 2 }).await.unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    // The effect ran to completion; its feedback arrived after shutdown began
    assert_eq!(rx.try_recv().unwrap(), FetchAction::Fetched { id: 2, items: 2 });
    assert!(store.state(|s| s.fetched.is_empty()).await);
    assert_eq!(
        store.send(FetchAction::Fetch { id: 4 }).await.unwrap_err(),
        StoreError::ShutdownInProgress
    );
}
