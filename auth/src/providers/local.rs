//! Identity provider backed by this service's own account storage.
//!
//! Passwords are hashed with bcrypt on the blocking pool. OAuth sign-ins are
//! linked to an existing account by provider subject first, then by email,
//! and create a password-less account otherwise.

use crate::config::{OAuthConfig, SessionConfig};
use crate::error::{AuthError, Result};
use crate::providers::{
    IdentityProvider, OAuth2Provider, OAuthUserInfo, SessionRepository, UserRecord, UserRepository,
};
use crate::state::{
    OAuthProvider, OAuthState, ProviderUser, Session, SessionChange, SessionId, UserCredential,
    UserId,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use std::sync::Arc;
use tasklist_core::environment::{Clock, SystemClock};
use tokio::sync::broadcast;

/// Capacity of the session-change channel.
const CHANGE_CAPACITY: usize = 64;

/// Bytes of randomness in an OAuth `state` parameter.
const STATE_BYTES: usize = 32;

/// Local identity provider.
///
/// # Type Parameters
///
/// - `U`: account storage
/// - `S`: session storage
/// - `O`: OAuth clients
pub struct LocalIdentityProvider<U, S, O> {
    users: U,
    sessions: S,
    oauth: O,
    session_config: SessionConfig,
    oauth_config: OAuthConfig,
    clock: Arc<dyn Clock>,
    changes: broadcast::Sender<SessionChange>,
}

impl<U, S, O> LocalIdentityProvider<U, S, O>
where
    U: UserRepository,
    S: SessionRepository,
    O: OAuth2Provider,
{
    /// Create a provider with default configuration and the system clock.
    #[must_use]
    pub fn new(users: U, sessions: S, oauth: O) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            users,
            sessions,
            oauth,
            session_config: SessionConfig::default(),
            oauth_config: OAuthConfig::default(),
            clock: Arc::new(SystemClock),
            changes,
        }
    }

    /// Set the password and session policy.
    #[must_use]
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Set the OAuth redirect configuration.
    #[must_use]
    pub fn with_oauth_config(mut self, config: OAuthConfig) -> Self {
        self.oauth_config = config;
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Account storage.
    pub const fn users(&self) -> &U {
        &self.users
    }

    /// Session storage.
    pub const fn sessions(&self) -> &S {
        &self.sessions
    }

    /// OAuth clients.
    pub const fn oauth(&self) -> &O {
        &self.oauth
    }

    async fn open_session(&self, user: &UserRecord) -> Result<UserCredential> {
        let now = self.clock.now();
        let session = Session {
            session_id: SessionId::new(),
            user_id: user.user_id.clone(),
            created_at: now,
            expires_at: now + self.session_config.session_duration,
        };

        self.sessions
            .create(&session, self.session_config.session_duration)
            .await?;

        let provider_user = user.to_provider_user();
        let _ = self.changes.send(SessionChange {
            session_id: session.session_id,
            user: Some(provider_user.clone()),
        });

        tracing::info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            "Session opened"
        );

        Ok(UserCredential {
            user: provider_user,
            session,
        })
    }

    async fn resolve_oauth_account(
        &self,
        provider: OAuthProvider,
        info: OAuthUserInfo,
    ) -> Result<UserRecord> {
        if let Some(user) = self
            .users
            .find_by_oauth(provider, &info.provider_user_id)
            .await?
        {
            return Ok(user);
        }

        let email = info.email.as_deref().map(normalize_email);

        if let Some(email) = email.as_deref() {
            if let Some(mut user) = self.users.find_by_email(email).await? {
                self.users
                    .link_oauth(&user.user_id, provider, &info.provider_user_id)
                    .await?;
                tracing::info!(
                    user_id = %user.user_id,
                    provider = %provider,
                    "Linked OAuth identity to existing account"
                );
                user.oauth_provider = Some(provider);
                user.oauth_subject = Some(info.provider_user_id);
                return Ok(user);
            }
        }

        let user = UserRecord {
            user_id: UserId::generate(),
            email,
            password_hash: None,
            display_name: info.name,
            oauth_provider: Some(provider),
            oauth_subject: Some(info.provider_user_id),
            created_at: self.clock.now(),
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.user_id, provider = %provider, "Created OAuth account");

        Ok(user)
    }
}

impl<U, S, O> IdentityProvider for LocalIdentityProvider<U, S, O>
where
    U: UserRepository,
    S: SessionRepository,
    O: OAuth2Provider,
{
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserCredential> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if password.chars().count() < self.session_config.min_password_length {
            return Err(AuthError::WeakPassword {
                min_length: self.session_config.min_password_length,
            });
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let password_hash = hash_password(password, self.session_config.bcrypt_cost).await?;
        let user = UserRecord {
            user_id: UserId::generate(),
            email: Some(email),
            password_hash: Some(password_hash),
            display_name: None,
            oauth_provider: None,
            oauth_subject: None,
            created_at: self.clock.now(),
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.user_id, "Registered account");

        self.open_session(&user).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserCredential> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // OAuth-only accounts have no password to check
        let Some(hash) = user.password_hash.clone() else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, hash).await? {
            tracing::warn!(user_id = %user.user_id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(&user).await
    }

    async fn authorize(&self, provider: OAuthProvider) -> Result<String> {
        let state = OAuthState {
            state_param: generate_state(),
            provider,
            initiated_at: self.clock.now(),
        };
        let redirect_uri = self.oauth_config.redirect_uri(provider);

        let url = self
            .oauth
            .build_authorization_url(provider, &state.state_param, &redirect_uri)
            .await?;

        self.sessions
            .put_oauth_state(&state, self.oauth_config.state_ttl())
            .await?;

        tracing::debug!(provider = %provider, "OAuth flow started");
        Ok(url)
    }

    async fn complete_authorization(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
    ) -> Result<UserCredential> {
        if code.is_empty() {
            return Err(AuthError::MissingField("code"));
        }

        let stored = self
            .sessions
            .take_oauth_state(state)
            .await?
            .ok_or(AuthError::OAuthStateInvalid)?;

        let expired = stored.initiated_at + self.oauth_config.state_ttl() <= self.clock.now();
        if expired
            || stored.provider != provider
            || !constant_time_eq::constant_time_eq(stored.state_param.as_bytes(), state.as_bytes())
        {
            tracing::warn!(provider = %provider, expired, "Rejected OAuth state");
            return Err(AuthError::OAuthStateInvalid);
        }

        let redirect_uri = self.oauth_config.redirect_uri(provider);
        let token = self.oauth.exchange_code(provider, code, &redirect_uri).await?;
        let info = self
            .oauth
            .fetch_user_info(provider, &token.access_token)
            .await?;

        let user = self.resolve_oauth_account(provider, info).await?;
        self.open_session(&user).await
    }

    async fn update_display_name(
        &self,
        user_id: &UserId,
        display_name: &str,
    ) -> Result<ProviderUser> {
        let user = self.users.set_display_name(user_id, display_name).await?;
        tracing::debug!(user_id = %user_id, "Display name updated");
        Ok(user.to_provider_user())
    }

    async fn current_user(&self, session_id: SessionId) -> Result<Option<ProviderUser>> {
        let Some(session) = self.sessions.get(session_id).await? else {
            return Ok(None);
        };
        if session.is_expired(self.clock.now()) {
            return Ok(None);
        }

        Ok(self
            .users
            .find_by_id(&session.user_id)
            .await?
            .map(|user| user.to_provider_user()))
    }

    async fn sign_out(&self, session_id: SessionId) -> Result<()> {
        let removed = self.sessions.delete(session_id).await?;
        let _ = self.changes.send(SessionChange {
            session_id,
            user: None,
        });

        tracing::info!(session_id = %session_id, removed, "Signed out");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}

/// Trimmed, lowercase form used for email comparisons.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 32 random bytes, base64url without padding.
fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::InternalError(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::InternalError(format!("Failed to hash password: {e}")))
}

async fn verify_password(password: &str, hash: String) -> Result<bool> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::InternalError(format!("verification task failed: {e}")))?
        .map_err(|e| AuthError::InternalError(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockOAuth2Provider, MockSessionRepository, MockUserRepository};
    use chrono::Duration;
    use tasklist_testing::mocks::{ManualClock, test_clock};

    type TestProvider =
        LocalIdentityProvider<MockUserRepository, MockSessionRepository, MockOAuth2Provider>;

    fn provider() -> TestProvider {
        LocalIdentityProvider::new(
            MockUserRepository::new(),
            MockSessionRepository::new(),
            MockOAuth2Provider::new(),
        )
        .with_session_config(SessionConfig::default().with_bcrypt_cost(4))
    }

    fn provider_at(clock: &ManualClock) -> TestProvider {
        provider().with_clock(Arc::new(clock.clone()))
    }

    #[test]
    fn state_parameter_is_32_bytes_base64url() {
        let state = generate_state();
        assert_eq!(state.len(), 43);
        assert!(!state.contains('+') && !state.contains('/') && !state.contains('='));
        assert_eq!(URL_SAFE_NO_PAD.decode(&state).unwrap().len(), STATE_BYTES);
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_keeps_user_id() {
        let provider = provider();

        let created = provider.sign_up("Ana@Example.com ", "hunter22").await.unwrap();
        let signed_in = provider
            .sign_in_with_password("ana@example.com", "hunter22")
            .await
            .unwrap();

        assert_eq!(created.user.user_id, signed_in.user.user_id);
        assert_eq!(signed_in.user.email.as_deref(), Some("ana@example.com"));
        assert_ne!(created.session.session_id, signed_in.session.session_id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let provider = provider();
        provider.sign_up("ana@example.com", "hunter22").await.unwrap();

        let result = provider.sign_up("ANA@example.com", "another1").await;
        assert_eq!(result.unwrap_err(), AuthError::EmailAlreadyInUse);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let result = provider().sign_up("ana@example.com", "abc").await;
        assert_eq!(result.unwrap_err(), AuthError::WeakPassword { min_length: 6 });
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let provider = provider();
        provider.sign_up("ana@example.com", "hunter22").await.unwrap();

        let result = provider
            .sign_in_with_password("ana@example.com", "hunter23")
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);

        let unknown = provider
            .sign_in_with_password("bob@example.com", "hunter22")
            .await;
        assert_eq!(unknown.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn sign_in_and_sign_out_are_broadcast() {
        let provider = provider();
        let mut changes = provider.subscribe();

        let credential = provider.sign_up("ana@example.com", "hunter22").await.unwrap();
        let opened = changes.recv().await.unwrap();
        assert_eq!(opened.session_id, credential.session.session_id);
        assert_eq!(opened.user, Some(credential.user.clone()));

        provider.sign_out(credential.session.session_id).await.unwrap();
        let closed = changes.recv().await.unwrap();
        assert_eq!(closed.user, None);

        let current = provider
            .current_user(credential.session.session_id)
            .await
            .unwrap();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn oauth_state_is_single_use_and_provider_bound() {
        let provider = provider();

        let url = provider.authorize(OAuthProvider::GitHub).await.unwrap();
        let state = MockOAuth2Provider::state_from_url(&url).unwrap();

        let wrong_provider = provider
            .complete_authorization(OAuthProvider::Google, "code", &state)
            .await;
        assert_eq!(wrong_provider.unwrap_err(), AuthError::OAuthStateInvalid);

        // The failed attempt consumed the state
        let replay = provider
            .complete_authorization(OAuthProvider::GitHub, "code", &state)
            .await;
        assert_eq!(replay.unwrap_err(), AuthError::OAuthStateInvalid);
    }

    #[tokio::test]
    async fn oauth_links_existing_account_by_email() {
        let provider = provider();
        let local = provider.sign_up("octo@example.com", "hunter22").await.unwrap();
        provider.oauth.set_user_info(OAuthUserInfo {
            provider_user_id: "583231".to_string(),
            email: Some("Octo@example.com".to_string()),
            name: Some("Octocat".to_string()),
        });

        let url = provider.authorize(OAuthProvider::GitHub).await.unwrap();
        let state = MockOAuth2Provider::state_from_url(&url).unwrap();
        let linked = provider
            .complete_authorization(OAuthProvider::GitHub, "code", &state)
            .await
            .unwrap();

        assert_eq!(linked.user.user_id, local.user.user_id);

        let record = provider
            .users()
            .find_by_oauth(OAuthProvider::GitHub, "583231")
            .await
            .unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn oauth_creates_account_with_provider_name() {
        let provider = provider();
        provider.oauth.set_user_info(OAuthUserInfo {
            provider_user_id: "g-1".to_string(),
            email: None,
            name: Some("Grace".to_string()),
        });

        let url = provider.authorize(OAuthProvider::Google).await.unwrap();
        let state = MockOAuth2Provider::state_from_url(&url).unwrap();
        let credential = provider
            .complete_authorization(OAuthProvider::Google, "code", &state)
            .await
            .unwrap();

        assert_eq!(credential.user.display_name.as_deref(), Some("Grace"));
        assert!(credential.user.email.is_none());
    }

    #[tokio::test]
    async fn update_display_name_is_visible_through_session() {
        let provider = provider();
        let credential = provider.sign_up("ana@example.com", "hunter22").await.unwrap();

        provider
            .update_display_name(&credential.user.user_id, "ana")
            .await
            .unwrap();

        let current = provider
            .current_user(credential.session.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.display_name.as_deref(), Some("ana"));
    }

    #[tokio::test]
    async fn oauth_state_is_accepted_within_five_minutes() {
        let clock = test_clock();
        let provider = provider_at(&clock);

        let url = provider.authorize(OAuthProvider::GitHub).await.unwrap();
        let state = MockOAuth2Provider::state_from_url(&url).unwrap();
        clock.advance(Duration::minutes(4) + Duration::seconds(59));

        let credential = provider
            .complete_authorization(OAuthProvider::GitHub, "code", &state)
            .await;
        assert!(credential.is_ok());
    }

    #[tokio::test]
    async fn oauth_state_expires_after_five_minutes() {
        let clock = test_clock();
        let provider = provider_at(&clock);

        let url = provider.authorize(OAuthProvider::GitHub).await.unwrap();
        let state = MockOAuth2Provider::state_from_url(&url).unwrap();
        clock.advance(Duration::minutes(5));

        let result = provider
            .complete_authorization(OAuthProvider::GitHub, "code", &state)
            .await;
        assert_eq!(result.unwrap_err(), AuthError::OAuthStateInvalid);
    }

    #[tokio::test]
    async fn session_expires_after_24_hours() {
        let clock = test_clock();
        let provider = provider_at(&clock);
        let credential = provider.sign_up("ana@example.com", "hunter22").await.unwrap();
        let session_id = credential.session.session_id;

        clock.advance(Duration::hours(23) + Duration::minutes(59));
        assert!(provider.current_user(session_id).await.unwrap().is_some());

        clock.advance(Duration::minutes(1));
        assert!(provider.current_user(session_id).await.unwrap().is_none());
    }
}
