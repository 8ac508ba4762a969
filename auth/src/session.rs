//! Session Store.
//!
//! Folds identity-provider session notifications into one application-visible
//! [`SessionState`]: the current user plus a loading flag.
//!
//! # State machine
//!
//! ```text
//!             ProviderChanged            Resolved(user)
//! Unknown ──────────────────► loading ───────────────► Authenticated
//!   (loading)                    │
//!                                └─────────────────► Anonymous
//!                                    Resolved(None)
//! ```
//!
//! `SetUser` is the app-local write used right after sign-up, and `SignOut`
//! asks the provider to end the session. Both settle the state, so a
//! resolution still in flight when they land is dropped.
//!
//! A state bound to a session ignores notifications for other sessions, so
//! one process-wide provider can serve many session stores.

use crate::environment::SessionEnvironment;
use crate::providers::IdentityProvider;
use crate::state::{SessionChange, SessionId, SessionState, User};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::effect::Effect;
use tasklist_core::reducer::Reducer;
use tasklist_core::{SmallVec, smallvec};
use tasklist_runtime::{Store, StoreError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Confirmation shown after a successful sign-out.
pub const SIGNED_OUT_NOTICE: &str = "logged out successfully";

/// Store running the session reducer.
pub type SessionStore<P> =
    Store<SessionState, SessionAction, SessionEnvironment<P>, SessionReducer<P>>;

/// Inputs of the session reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// The provider reported a session change.
    ProviderChanged(SessionChange),

    /// A reported change has been resolved into the application user.
    Resolved {
        /// Session the change belongs to.
        session_id: SessionId,
        /// The user, or `None` when the session ended.
        user: Option<User>,
    },

    /// App-local write of the current user (sign-up, OAuth sign-in).
    SetUser {
        /// Session the user signed in on.
        session_id: SessionId,
        /// The signed-in user.
        user: User,
    },

    /// Ask the provider to end the current session.
    SignOut,

    /// The provider ended the session.
    SignedOut,

    /// The provider failed to end the session.
    SignOutFailed {
        /// Provider error text.
        message: String,
    },
}

/// Reducer behind the Session Store.
pub struct SessionReducer<P> {
    _provider: PhantomData<fn() -> P>,
}

impl<P> SessionReducer<P> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _provider: PhantomData,
        }
    }
}

impl<P> Default for SessionReducer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for SessionReducer<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

fn follows(state: &SessionState, session_id: SessionId) -> bool {
    state.session_id.is_none_or(|current| current == session_id)
}

impl<P> Reducer for SessionReducer<P>
where
    P: IdentityProvider + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::ProviderChanged(change) => {
                if !follows(state, change.session_id) {
                    tracing::trace!(session_id = %change.session_id, "Ignoring change for another session");
                    return smallvec![Effect::None];
                }

                state.is_loading = true;
                let session_id = change.session_id;
                let provider = Arc::clone(&env.provider);

                smallvec![Effect::future(async move {
                    let user = match change.user {
                        None => None,
                        // The notification carries the user as of session open
                        Some(snapshot) => match provider.current_user(session_id).await {
                            Ok(current) => current,
                            Err(error) => {
                                tracing::warn!(%error, session_id = %session_id, "Using notified user");
                                Some(snapshot)
                            },
                        },
                    };
                    Some(SessionAction::Resolved {
                        session_id,
                        user: user.map(User::from),
                    })
                })]
            },

            SessionAction::Resolved { session_id, user } => {
                // A SetUser or SignedOut since the change already settled the state
                if !state.is_loading || !follows(state, session_id) {
                    tracing::trace!(session_id = %session_id, "Dropping superseded resolution");
                    return smallvec![Effect::None];
                }

                match user {
                    Some(user) => {
                        tracing::debug!(user_id = %user.id, "Session authenticated");
                        state.current_user = Some(user);
                        state.session_id = Some(session_id);
                    },
                    None => {
                        tracing::debug!(session_id = %session_id, "Session anonymous");
                        state.current_user = None;
                        state.session_id = None;
                    },
                }
                state.is_loading = false;

                smallvec![Effect::None]
            },

            SessionAction::SetUser { session_id, user } => {
                state.current_user = Some(user);
                state.session_id = Some(session_id);
                state.is_loading = false;

                smallvec![Effect::None]
            },

            SessionAction::SignOut => {
                let Some(session_id) = state.session_id else {
                    // Nothing to end at the provider
                    return smallvec![Effect::future(async { Some(SessionAction::SignedOut) })];
                };

                let provider = Arc::clone(&env.provider);
                smallvec![Effect::future(async move {
                    match provider.sign_out(session_id).await {
                        Ok(()) => Some(SessionAction::SignedOut),
                        Err(error) => Some(SessionAction::SignOutFailed {
                            message: error.to_string(),
                        }),
                    }
                })]
            },

            SessionAction::SignedOut => {
                state.current_user = None;
                state.session_id = None;
                state.is_loading = false;

                let notifier = Arc::clone(&env.notifier);
                smallvec![Effect::future(async move {
                    notifier.notify(SIGNED_OUT_NOTICE);
                    None
                })]
            },

            SessionAction::SignOutFailed { message } => {
                // Logged only; the user sees no notice
                tracing::error!(error = %message, "Error signing out");
                smallvec![Effect::None]
            },
        }
    }
}

/// Create a Session Store in the initial loading state.
#[must_use]
pub fn session_store<P>(environment: SessionEnvironment<P>) -> SessionStore<P>
where
    P: IdentityProvider + 'static,
{
    Store::new(SessionState::default(), SessionReducer::new(), environment)
}

/// App-local write of the current user.
///
/// # Errors
///
/// Returns [`StoreError`] if the store is shutting down or the write does
/// not settle within `timeout`.
pub async fn set_user<P>(
    store: &SessionStore<P>,
    session_id: SessionId,
    user: User,
    timeout: Duration,
) -> Result<(), StoreError>
where
    P: IdentityProvider + 'static,
{
    let mut handle = store.send(SessionAction::SetUser { session_id, user }).await?;
    handle.wait_with_timeout(timeout).await
}

/// End the current session and wait for the outcome.
///
/// Provider failures are logged, not returned; see [`SessionAction::SignOutFailed`].
///
/// # Errors
///
/// Returns [`StoreError`] if the store is shutting down or the provider
/// does not answer within `timeout`.
pub async fn sign_out<P>(store: &SessionStore<P>, timeout: Duration) -> Result<(), StoreError>
where
    P: IdentityProvider + 'static,
{
    let mut handle = store.send(SessionAction::SignOut).await?;
    handle.wait_with_timeout(timeout).await
}

/// Live subscription of a Session Store to provider notifications.
///
/// Dropping the observer unsubscribes.
#[derive(Debug)]
pub struct SessionObserver {
    task: Option<JoinHandle<()>>,
}

impl SessionObserver {
    /// Stop forwarding notifications.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    /// Returns `true` while notifications are being forwarded.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Session observer unsubscribed");
        }
    }
}

impl Drop for SessionObserver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Subscribe `store` to its provider's session-change notifications.
///
/// The subscription is taken before this returns, so no notification sent
/// afterwards is missed. Each notification is fully reduced before the next
/// one is forwarded.
#[must_use]
pub fn observe<P>(store: &SessionStore<P>) -> SessionObserver
where
    P: IdentityProvider + 'static,
{
    let mut changes = store.environment().provider.subscribe();
    let store = store.clone();

    let task = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => match store.send(SessionAction::ProviderChanged(change)).await {
                    Ok(mut handle) => handle.wait().await,
                    Err(error) => {
                        tracing::warn!(%error, "Session store closed, stopping observer");
                        break;
                    },
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session observer lagged");
                },
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    SessionObserver { task: Some(task) }
}
