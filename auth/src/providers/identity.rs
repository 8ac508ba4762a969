//! Identity provider trait.

use crate::error::Result;
use crate::state::{OAuthProvider, ProviderUser, SessionChange, SessionId, UserCredential, UserId};
use tokio::sync::broadcast;

/// The identity provider the application authenticates against.
///
/// Every call is a single request/response. Sessions opened and closed by
/// the provider are announced on the [`subscribe`](Self::subscribe) channel.
pub trait IdentityProvider: Send + Sync {
    /// Register an account with email and password, and open a session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Email already registered → `AuthError::EmailAlreadyInUse`
    /// - Password rejected → `AuthError::WeakPassword`
    /// - Storage request fails
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<UserCredential>> + Send;

    /// Verify an email/password pair and open a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on mismatch, or a storage error.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<UserCredential>> + Send;

    /// Start an OAuth authorization-code flow.
    ///
    /// # Returns
    ///
    /// The provider URL to redirect the user to.
    ///
    /// # Errors
    ///
    /// Returns error if the provider is not configured or the state cannot
    /// be stored.
    fn authorize(
        &self,
        provider: OAuthProvider,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Finish an OAuth flow: validate `state`, exchange `code`, link or
    /// create the account and open a session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - State unknown, expired or for another provider → `AuthError::OAuthStateInvalid`
    /// - Code rejected → `AuthError::OAuthCodeInvalid`
    /// - Provider or storage request fails
    fn complete_authorization(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
    ) -> impl std::future::Future<Output = Result<UserCredential>> + Send;

    /// Overwrite the profile display name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` or a storage error.
    fn update_display_name(
        &self,
        user_id: &UserId,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<ProviderUser>> + Send;

    /// The user signed in on `session_id`, if the session is live.
    ///
    /// # Errors
    ///
    /// Returns error if the storage request fails.
    fn current_user(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<ProviderUser>>> + Send;

    /// End a session.
    ///
    /// # Errors
    ///
    /// Returns error if the storage request fails.
    fn sign_out(&self, session_id: SessionId)
    -> impl std::future::Future<Output = Result<()>> + Send;

    /// Subscribe to session-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}
