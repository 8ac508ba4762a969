//! Auth Actions.
//!
//! Request/response wrappers around an [`IdentityProvider`] that report every
//! outcome to the user through a [`Notifier`]. Each call is independent: the
//! only state touched is the optional [`SessionStore`] attached with
//! [`AuthActions::with_session`].
//!
//! Empty input is rejected silently with [`AuthError::MissingField`]; every
//! other failure is logged and notified with [`AuthError::user_message`].

use crate::error::{AuthError, Result};
use crate::providers::IdentityProvider;
use crate::session::{self, SessionStore};
use crate::state::{OAuthProvider, ProviderUser, SessionId, User, UserCredential, UserId};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::notify::Notifier;

/// How long an action waits for the Session Store to settle.
const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Auth Actions bound to one identity provider.
pub struct AuthActions<P>
where
    P: IdentityProvider + 'static,
{
    provider: Arc<P>,
    notifier: Arc<dyn Notifier>,
    session: Option<SessionStore<P>>,
}

impl<P> Clone for AuthActions<P>
where
    P: IdentityProvider + 'static,
{
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            notifier: Arc::clone(&self.notifier),
            session: self.session.clone(),
        }
    }
}

impl<P> AuthActions<P>
where
    P: IdentityProvider + 'static,
{
    /// Create actions that report to `notifier`.
    #[must_use]
    pub fn new(provider: Arc<P>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider,
            notifier,
            session: None,
        }
    }

    /// Write sign-up and OAuth results into `store`, and sign out through it.
    #[must_use]
    pub fn with_session(mut self, store: SessionStore<P>) -> Self {
        self.session = Some(store);
        self
    }

    /// The identity provider behind these actions.
    #[must_use]
    pub const fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Register an account and name it `username`.
    ///
    /// Setting the display name is best-effort: on failure the account still
    /// exists and the returned user keeps its unset name.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingField`] (silent) if any argument is empty
    /// - Any provider error from account creation
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserCredential> {
        require(username, "username")
            .and_then(|()| require(email, "email"))
            .and_then(|()| require(password, "password"))
            .map_err(|error| self.report(error))?;

        let mut credential = self
            .provider
            .sign_up(email, password)
            .await
            .map_err(|error| self.report(error))?;

        match self
            .provider
            .update_display_name(&credential.user.user_id, username)
            .await
        {
            Ok(user) => credential.user = user,
            Err(error) => {
                tracing::error!(%error, user_id = %credential.user.user_id, "Failed to set display name");
            },
        }

        self.store_user(&credential).await;
        self.notifier
            .notify(&format!("{username} is registered successfully"));

        Ok(credential)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingField`] (silent) if any argument is empty
    /// - [`AuthError::InvalidCredentials`] and other provider errors
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserCredential> {
        require(email, "email")
            .and_then(|()| require(password, "password"))
            .map_err(|error| self.report(error))?;

        let credential = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|error| self.report(error))?;

        self.store_user(&credential).await;
        self.notify_signed_in(&credential.user);
        Ok(credential)
    }

    /// Start an OAuth sign-in; returns the URL to send the browser to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::OAuthNotConfigured`] when the provider has no
    /// client, or a storage error if the `state` cannot be saved.
    pub async fn begin_oauth(&self, provider: OAuthProvider) -> Result<String> {
        self.provider
            .authorize(provider)
            .await
            .map_err(|error| self.report(error))
    }

    /// Complete a Google sign-in started with [`Self::begin_oauth`].
    ///
    /// # Errors
    ///
    /// See [`Self::complete_oauth`].
    pub async fn sign_in_with_google(&self, code: &str, state: &str) -> Result<UserCredential> {
        self.complete_oauth(OAuthProvider::Google, code, state).await
    }

    /// Complete a GitHub sign-in started with [`Self::begin_oauth`].
    ///
    /// # Errors
    ///
    /// See [`Self::complete_oauth`].
    pub async fn sign_in_with_github(&self, code: &str, state: &str) -> Result<UserCredential> {
        self.complete_oauth(OAuthProvider::GitHub, code, state).await
    }

    /// Complete an OAuth sign-in for `provider`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::OAuthStateInvalid`] for an unknown, reused, expired or
    ///   mismatched `state`
    /// - [`AuthError::OAuthCodeInvalid`] if the provider rejects `code`
    #[tracing::instrument(skip(self, code, state))]
    pub async fn complete_oauth(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
    ) -> Result<UserCredential> {
        let credential = self
            .provider
            .complete_authorization(provider, code, state)
            .await
            .map_err(|error| self.report(error))?;

        self.store_user(&credential).await;
        self.notify_signed_in(&credential.user);
        Ok(credential)
    }

    /// End `session_id`.
    ///
    /// With a Session Store attached the store drives the sign-out, so a
    /// provider failure is logged and not returned.
    ///
    /// # Errors
    ///
    /// Without a store, any provider error.
    pub async fn sign_out(&self, session_id: SessionId) -> Result<()> {
        if let Some(store) = &self.session {
            return session::sign_out(store, SESSION_TIMEOUT)
                .await
                .map_err(|error| AuthError::InternalError(error.to_string()));
        }

        match self.provider.sign_out(session_id).await {
            Ok(()) => {
                self.notifier.notify(session::SIGNED_OUT_NOTICE);
                Ok(())
            },
            Err(error) => {
                tracing::error!(%error, session_id = %session_id, "Error signing out");
                Err(error)
            },
        }
    }

    /// Change the display name of `user_id`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingField`] (silent) if `display_name` is empty
    /// - [`AuthError::UserNotFound`] and other provider errors
    pub async fn update_display_name(
        &self,
        user_id: &UserId,
        display_name: &str,
    ) -> Result<ProviderUser> {
        require(display_name, "display_name").map_err(|error| self.report(error))?;

        self.provider
            .update_display_name(user_id, display_name)
            .await
            .map_err(|error| self.report(error))
    }

    async fn store_user(&self, credential: &UserCredential) {
        let Some(store) = &self.session else {
            return;
        };

        let user = User::from(&credential.user);
        if let Err(error) =
            session::set_user(store, credential.session.session_id, user, SESSION_TIMEOUT).await
        {
            tracing::warn!(%error, "Session store rejected user");
        }
    }

    fn notify_signed_in(&self, user: &ProviderUser) {
        self.notifier.notify(&format!(
            "{} logged in successfully",
            user.display_name_or_null()
        ));
    }

    /// Log and notify `error` unless it is silent, then hand it back.
    fn report(&self, error: AuthError) -> AuthError {
        if error.is_silent() {
            tracing::debug!(%error, "Ignored incomplete input");
        } else {
            if error.is_user_error() {
                tracing::warn!(%error, "Auth action rejected");
            } else {
                tracing::error!(%error, "Auth action failed");
            }
            self.notifier.notify(&error.user_message());
        }
        error
    }
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        Err(AuthError::MissingField(field))
    } else {
        Ok(())
    }
}
