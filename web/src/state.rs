//! Application state for Axum handlers.

use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::providers::IdentityProvider;
use tasklist_tasks::TaskStore;

/// Default lifetime of the session cookie.
const DEFAULT_COOKIE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Application state shared across all HTTP handlers.
///
/// Holds the process-wide collaborators only. Notifiers and controller
/// stores are created per request so notices never leak between clients.
///
/// # Type Parameters
///
/// - `P`: identity provider
/// - `S`: task document store
pub struct AppState<P, S> {
    /// Identity provider.
    pub provider: Arc<P>,

    /// Task document store.
    pub tasks: Arc<S>,

    /// `Max-Age` of the session cookie.
    pub cookie_max_age: Duration,

    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl<P, S> AppState<P, S>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    /// Create a new application state.
    #[must_use]
    pub const fn new(provider: Arc<P>, tasks: Arc<S>) -> Self {
        Self {
            provider,
            tasks,
            cookie_max_age: DEFAULT_COOKIE_MAX_AGE,
            secure_cookies: false,
        }
    }

    /// Set the session cookie lifetime.
    #[must_use]
    pub fn with_cookie_max_age(mut self, max_age: Duration) -> Self {
        self.cookie_max_age = max_age;
        self
    }

    /// Mark the session cookie `Secure` (HTTPS deployments).
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

// Manual impl: `P` and `S` are shared through `Arc`
impl<P, S> Clone for AppState<P, S> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            tasks: Arc::clone(&self.tasks),
            cookie_max_age: self.cookie_max_age,
            secure_cookies: self.secure_cookies,
        }
    }
}
