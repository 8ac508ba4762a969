//! End-to-end auth flows against the in-memory providers.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::mocks::{
    MockIdentityProvider, MockOAuth2Provider, MockSessionRepository, MockUserRepository,
};
use tasklist_auth::providers::OAuthUserInfo;
use tasklist_auth::session::{self, SIGNED_OUT_NOTICE};
use tasklist_auth::{
    AuthActions, AuthError, OAuthProvider, SessionConfig, SessionEnvironment, SessionPhase,
    SessionState, SessionStore,
};
use tasklist_core::notify::RecordingNotifier;

const TIMEOUT: Duration = Duration::from_secs(2);

struct Harness {
    actions: AuthActions<MockIdentityProvider>,
    store: SessionStore<MockIdentityProvider>,
    notifier: RecordingNotifier,
    _observer: session::SessionObserver,
}

fn harness() -> Harness {
    let provider = Arc::new(
        MockIdentityProvider::new(
            MockUserRepository::new(),
            MockSessionRepository::new(),
            MockOAuth2Provider::new(),
        )
        .with_session_config(SessionConfig::default().with_bcrypt_cost(4)),
    );
    let notifier = RecordingNotifier::new();
    let store = session::session_store(SessionEnvironment::new(
        Arc::clone(&provider),
        Arc::new(notifier.clone()),
    ));
    let observer = session::observe(&store);
    let actions =
        AuthActions::new(provider, Arc::new(notifier.clone())).with_session(store.clone());

    Harness {
        actions,
        store,
        notifier,
        _observer: observer,
    }
}

async fn wait_for<F>(store: &SessionStore<MockIdentityProvider>, predicate: F) -> SessionState
where
    F: Fn(&SessionState) -> bool,
{
    tokio::time::timeout(TIMEOUT, async {
        loop {
            let state = store.state(Clone::clone).await;
            if predicate(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn session_starts_unknown() {
    let h = harness();
    let state = h.store.state(Clone::clone).await;
    assert_eq!(state.phase(), SessionPhase::Unknown);
}

#[tokio::test]
async fn sign_up_sign_out_sign_in_keeps_identity() {
    let h = harness();

    let created = h
        .actions
        .sign_up("ana", "ana@example.com", "hunter22")
        .await
        .unwrap();
    let state = wait_for(&h.store, |s| s.phase() == SessionPhase::Authenticated).await;
    assert_eq!(state.current_user.unwrap().id, created.user.user_id);

    h.actions
        .sign_out(created.session.session_id)
        .await
        .unwrap();
    wait_for(&h.store, |s| s.phase() == SessionPhase::Anonymous).await;

    let signed_in = h
        .actions
        .sign_in("ana@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(signed_in.user.user_id, created.user.user_id);

    let state = wait_for(&h.store, |s| {
        s.session_id == Some(signed_in.session.session_id) && !s.is_loading
    })
    .await;
    assert_eq!(state.current_user.unwrap().username.as_deref(), Some("ana"));

    assert_eq!(
        h.notifier.messages(),
        vec![
            "ana is registered successfully".to_string(),
            SIGNED_OUT_NOTICE.to_string(),
            "ana logged in successfully".to_string(),
        ]
    );
}

#[tokio::test]
async fn sign_up_username_survives_provider_notification() {
    let h = harness();

    h.actions
        .sign_up("ana", "ana@example.com", "hunter22")
        .await
        .unwrap();
    let right_after = h.store.state(Clone::clone).await;
    assert_eq!(
        right_after.current_user.unwrap().username.as_deref(),
        Some("ana")
    );

    // Let the observer reduce the notification sent when the session opened
    tokio::time::sleep(Duration::from_millis(50)).await;
    let settled = wait_for(&h.store, |s| !s.is_loading).await;
    assert_eq!(
        settled.current_user.unwrap().username.as_deref(),
        Some("ana")
    );
}

#[tokio::test]
async fn github_sign_in_round_trip() {
    let h = harness();
    h.actions.provider().oauth().set_user_info(OAuthUserInfo {
        provider_user_id: "583231".to_string(),
        email: Some("octocat@example.com".to_string()),
        name: Some("The Octocat".to_string()),
    });

    let url = h.actions.begin_oauth(OAuthProvider::GitHub).await.unwrap();
    let state = MockOAuth2Provider::state_from_url(&url).unwrap();
    assert_eq!(state.len(), 43);

    let credential = h.actions.sign_in_with_github("code-1", &state).await.unwrap();

    let session = wait_for(&h.store, |s| s.phase() == SessionPhase::Authenticated).await;
    assert_eq!(session.current_user.unwrap().id, credential.user.user_id);
    assert_eq!(
        h.notifier.messages(),
        vec!["The Octocat logged in successfully"]
    );

    // A second callback with the same state is a replay
    let replay = h.actions.sign_in_with_github("code-1", &state).await;
    assert_eq!(replay.unwrap_err(), AuthError::OAuthStateInvalid);
}

#[tokio::test]
async fn failed_oauth_exchange_notifies_provider_error() {
    let provider = Arc::new(MockIdentityProvider::new(
        MockUserRepository::new(),
        MockSessionRepository::new(),
        MockOAuth2Provider::failing(),
    ));
    let notifier = RecordingNotifier::new();
    let actions = AuthActions::new(provider, Arc::new(notifier.clone()));

    let url = actions.begin_oauth(OAuthProvider::Google).await.unwrap();
    let state = MockOAuth2Provider::state_from_url(&url).unwrap();
    let result = actions.sign_in_with_google("bad-code", &state).await;

    let error = result.unwrap_err();
    assert_eq!(notifier.messages(), vec![error.user_message()]);
}
