//! Session environment.
//!
//! Dependencies injected into the [`SessionReducer`](crate::session::SessionReducer).

use crate::providers::IdentityProvider;
use std::sync::Arc;
use tasklist_core::notify::Notifier;

/// Session environment.
///
/// # Type Parameters
///
/// - `P`: identity provider
pub struct SessionEnvironment<P> {
    /// Identity provider that owns sessions.
    pub provider: Arc<P>,

    /// Sink for user-visible notifications.
    pub notifier: Arc<dyn Notifier>,
}

impl<P> SessionEnvironment<P>
where
    P: IdentityProvider,
{
    /// Create a new session environment.
    #[must_use]
    pub fn new(provider: Arc<P>, notifier: Arc<dyn Notifier>) -> Self {
        Self { provider, notifier }
    }
}

// Manual impl: `P` itself need not be `Clone`
impl<P> Clone for SessionEnvironment<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            notifier: Arc::clone(&self.notifier),
        }
    }
}
