//! Mock session repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::SessionRepository;
use crate::state::{OAuthState, Session, SessionId};
use chrono::Duration;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock session repository.
///
/// Uses in-memory storage. TTLs are not enforced here; expiry is checked
/// against `Session::expires_at` by the identity provider.
#[derive(Debug, Clone, Default)]
pub struct MockSessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    oauth_states: Arc<Mutex<HashMap<String, OAuthState>>>,
    fail_deletes: Arc<AtomicBool>,
}

fn lock_failed() -> AuthError {
    AuthError::InternalError("Mutex lock failed".to_string())
}

impl MockSessionRepository {
    /// Create a new mock session repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `delete` fail with a storage error.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Get count of stored sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.lock().map_err(|_| lock_failed())?.len())
    }
}

impl SessionRepository for MockSessionRepository {
    fn create(&self, session: &Session, _ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let session = session.clone();

        async move {
            let mut guard = sessions.lock().map_err(|_| lock_failed())?;
            if guard.contains_key(&session.session_id) {
                return Err(AuthError::SessionStorage(
                    "Session ID already exists".to_string(),
                ));
            }
            guard.insert(session.session_id, session);
            Ok(())
        }
    }

    fn get(&self, session_id: SessionId) -> impl Future<Output = Result<Option<Session>>> + Send {
        let sessions = Arc::clone(&self.sessions);

        async move {
            Ok(sessions
                .lock()
                .map_err(|_| lock_failed())?
                .get(&session_id)
                .cloned())
        }
    }

    fn delete(&self, session_id: SessionId) -> impl Future<Output = Result<bool>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let fail = self.fail_deletes.load(Ordering::SeqCst);

        async move {
            if fail {
                return Err(AuthError::SessionStorage("connection refused".to_string()));
            }
            Ok(sessions
                .lock()
                .map_err(|_| lock_failed())?
                .remove(&session_id)
                .is_some())
        }
    }

    fn put_oauth_state(
        &self,
        state: &OAuthState,
        _ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send {
        let states = Arc::clone(&self.oauth_states);
        let state = state.clone();

        async move {
            states
                .lock()
                .map_err(|_| lock_failed())?
                .insert(state.state_param.clone(), state);
            Ok(())
        }
    }

    fn take_oauth_state(
        &self,
        state_param: &str,
    ) -> impl Future<Output = Result<Option<OAuthState>>> + Send {
        let states = Arc::clone(&self.oauth_states);
        let state_param = state_param.to_string();

        async move { Ok(states.lock().map_err(|_| lock_failed())?.remove(&state_param)) }
    }
}
