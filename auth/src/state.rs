//! Authentication state types.
//!
//! All types are `Clone` so they can flow through reducers and actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Opaque user identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a session.
///
/// Doubles as the bearer token and the value of the `session` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a session identifier from its textual form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        uuid::Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

/// User object returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    /// Provider-assigned identifier.
    pub user_id: UserId,

    /// Email address, absent for some OAuth accounts.
    pub email: Option<String>,

    /// Profile display name.
    pub display_name: Option<String>,
}

impl ProviderUser {
    /// Display name for notifications.
    ///
    /// Unset names render as `"null"`, matching how the provider's profile
    /// object is interpolated when no name was ever set.
    #[must_use]
    pub fn display_name_or_null(&self) -> &str {
        self.display_name.as_deref().unwrap_or("null")
    }
}

/// The application's view of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned identifier.
    pub id: UserId,

    /// Email address.
    pub email: Option<String>,

    /// Display name (the username chosen at sign-up).
    pub username: Option<String>,
}

impl From<&ProviderUser> for User {
    fn from(user: &ProviderUser) -> Self {
        Self {
            id: user.user_id.clone(),
            email: user.email.clone(),
            username: user.display_name.clone(),
        }
    }
}

impl From<ProviderUser> for User {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.user_id,
            email: user.email,
            username: user.display_name,
        }
    }
}

/// Application-visible session state.
///
/// Starts in the loading state until the first provider notification.
///
/// # Examples
///
/// ```
/// # use tasklist_auth::SessionState;
/// let state = SessionState::default();
/// assert!(state.is_loading);
/// assert!(state.current_user.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Signed-in user, if any.
    pub current_user: Option<User>,

    /// `true` while the session is being resolved.
    pub is_loading: bool,

    /// Provider session this state follows, once one is known.
    pub session_id: Option<SessionId>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_user: None,
            is_loading: true,
            session_id: None,
        }
    }
}

impl SessionState {
    /// Resolved state for a signed-in user.
    #[must_use]
    pub const fn authenticated(session_id: SessionId, user: User) -> Self {
        Self {
            current_user: Some(user),
            is_loading: false,
            session_id: Some(session_id),
        }
    }

    /// Resolved state with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            current_user: None,
            is_loading: false,
            session_id: None,
        }
    }

    /// Coarse phase of the session state machine.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Unknown
        } else if self.current_user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }
}

/// Phases of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the provider to report the session.
    Unknown,
    /// A user is signed in.
    Authenticated,
    /// Nobody is signed in.
    Anonymous,
}

/// Server-side session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: SessionId,

    /// Owner of the session.
    pub user_id: UserId,

    /// Session creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Session expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Successful sign-in or sign-up: the provider user plus the opened session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    /// Provider user object.
    pub user: ProviderUser,

    /// Session opened for the user.
    pub session: Session,
}

/// Notification published by the identity provider whenever a session's
/// signed-in user changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// Session whose user changed.
    pub session_id: SessionId,

    /// The signed-in user, or `None` after sign-out.
    pub user: Option<ProviderUser>,
}

// ═══════════════════════════════════════════════════════════════════════
// OAuth
// ═══════════════════════════════════════════════════════════════════════

/// `OAuth` provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    /// Google `OAuth`.
    Google,
    /// GitHub `OAuth`.
    GitHub,
}

impl OAuthProvider {
    /// Get the provider name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = crate::error::AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::GitHub),
            _ => Err(crate::error::AuthError::InvalidOAuthProvider),
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending authorization-code flow, keyed by its CSRF `state` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    /// Random state parameter (32 bytes, base64url).
    pub state_param: String,

    /// Provider the flow was started for.
    pub provider: OAuthProvider,

    /// Timestamp when the flow was initiated.
    pub initiated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_generation() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 32);
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::new();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
        assert_eq!(SessionId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_oauth_provider_from_str() {
        assert_eq!("GitHub".parse::<OAuthProvider>(), Ok(OAuthProvider::GitHub));
        assert_eq!("google".parse::<OAuthProvider>(), Ok(OAuthProvider::Google));
        assert!("microsoft".parse::<OAuthProvider>().is_err());
    }

    #[test]
    fn test_session_phases() {
        assert_eq!(SessionState::default().phase(), SessionPhase::Unknown);
        assert_eq!(SessionState::anonymous().phase(), SessionPhase::Anonymous);

        let user = User {
            id: UserId::new("u1"),
            email: None,
            username: Some("ana".into()),
        };
        let state = SessionState::authenticated(SessionId::new(), user);
        assert_eq!(state.phase(), SessionPhase::Authenticated);
    }

    #[test]
    fn test_unset_display_name_renders_null() {
        let user = ProviderUser {
            user_id: UserId::new("u1"),
            email: Some("a@example.com".into()),
            display_name: None,
        };
        assert_eq!(user.display_name_or_null(), "null");
    }
}
