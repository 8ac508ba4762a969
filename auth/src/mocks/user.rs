//! Mock user repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::{UserRecord, UserRepository};
use crate::state::{OAuthProvider, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock user repository.
///
/// Uses in-memory storage keyed by user id; email and OAuth lookups scan.
#[derive(Debug, Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<UserId, UserRecord>>>,
}

fn lock_failed() -> AuthError {
    AuthError::InternalError("Mutex lock failed".to_string())
}

impl MockUserRepository {
    /// Create a new mock user repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn user_count(&self) -> Result<usize> {
        Ok(self.users.lock().map_err(|_| lock_failed())?.len())
    }
}

impl UserRepository for MockUserRepository {
    fn find_by_id(&self, user_id: &UserId) -> impl Future<Output = Result<Option<UserRecord>>> + Send {
        let users = Arc::clone(&self.users);
        let user_id = user_id.clone();

        async move { Ok(users.lock().map_err(|_| lock_failed())?.get(&user_id).cloned()) }
    }

    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<UserRecord>>> + Send {
        let users = Arc::clone(&self.users);
        let email = email.to_string();

        async move {
            Ok(users
                .lock()
                .map_err(|_| lock_failed())?
                .values()
                .find(|u| u.email.as_deref() == Some(email.as_str()))
                .cloned())
        }
    }

    fn find_by_oauth(
        &self,
        provider: OAuthProvider,
        subject: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>>> + Send {
        let users = Arc::clone(&self.users);
        let subject = subject.to_string();

        async move {
            Ok(users
                .lock()
                .map_err(|_| lock_failed())?
                .values()
                .find(|u| {
                    u.oauth_provider == Some(provider)
                        && u.oauth_subject.as_deref() == Some(subject.as_str())
                })
                .cloned())
        }
    }

    fn create(&self, user: &UserRecord) -> impl Future<Output = Result<()>> + Send {
        let users = Arc::clone(&self.users);
        let user = user.clone();

        async move {
            let mut guard = users.lock().map_err(|_| lock_failed())?;
            let duplicate = user.email.is_some()
                && guard.values().any(|existing| existing.email == user.email);
            if duplicate {
                return Err(AuthError::EmailAlreadyInUse);
            }
            guard.insert(user.user_id.clone(), user);
            Ok(())
        }
    }

    fn link_oauth(
        &self,
        user_id: &UserId,
        provider: OAuthProvider,
        subject: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let users = Arc::clone(&self.users);
        let user_id = user_id.clone();
        let subject = subject.to_string();

        async move {
            let mut guard = users.lock().map_err(|_| lock_failed())?;
            let user = guard.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
            user.oauth_provider = Some(provider);
            user.oauth_subject = Some(subject);
            Ok(())
        }
    }

    fn set_display_name(
        &self,
        user_id: &UserId,
        display_name: &str,
    ) -> impl Future<Output = Result<UserRecord>> + Send {
        let users = Arc::clone(&self.users);
        let user_id = user_id.clone();
        let display_name = display_name.to_string();

        async move {
            let mut guard = users.lock().map_err(|_| lock_failed())?;
            let user = guard.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
            user.display_name = Some(display_name);
            Ok(user.clone())
        }
    }
}
