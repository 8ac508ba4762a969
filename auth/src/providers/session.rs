//! Session repository trait.

use crate::error::Result;
use crate::state::{OAuthState, Session, SessionId};
use chrono::Duration;

/// Session storage (Redis in production).
///
/// Also holds the short-lived CSRF `state` values of pending OAuth flows,
/// since both are ephemeral and shared across server instances.
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Session ID already exists
    fn create(
        &self,
        session: &Session,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Get a live session.
    ///
    /// # Returns
    ///
    /// `None` if the session does not exist or has expired.
    ///
    /// # Errors
    ///
    /// Returns error if the network request fails.
    fn get(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Session>>> + Send;

    /// Delete a session.
    ///
    /// # Returns
    ///
    /// `true` if a session was removed.
    ///
    /// # Errors
    ///
    /// Returns error if the network request fails.
    fn delete(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Remember a pending OAuth flow under its state parameter.
    ///
    /// # Errors
    ///
    /// Returns error if the network request fails.
    fn put_oauth_state(
        &self,
        state: &OAuthState,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Consume a pending OAuth flow.
    ///
    /// A state value can be taken at most once.
    ///
    /// # Returns
    ///
    /// The stored flow, or `None` if the state is unknown or expired.
    ///
    /// # Errors
    ///
    /// Returns error if the network request fails.
    fn take_oauth_state(
        &self,
        state_param: &str,
    ) -> impl std::future::Future<Output = Result<Option<OAuthState>>> + Send;
}
