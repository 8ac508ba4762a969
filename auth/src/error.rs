//! Error types for authentication operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Generic text shown when a failure has no provider message to surface.
pub const GENERIC_FAILURE: &str = "something went wrong";

/// Error taxonomy for authentication.
///
/// The `Display` text of user-facing variants is the provider message that
/// is surfaced verbatim in notifications. System variants are logged and
/// surfaced as [`GENERIC_FAILURE`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// A required field was empty. Callers treat this as a silent no-op.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Email/password pair did not match an account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up attempted with an email that already has an account.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// Password rejected by the account policy.
    #[error("password should be at least {min_length} characters")]
    WeakPassword {
        /// Minimum accepted length
        min_length: usize,
    },

    /// Account referenced by a session or profile update does not exist.
    #[error("user not found")]
    UserNotFound,

    /// OAuth authorization code was rejected by the provider.
    #[error("invalid OAuth authorization code")]
    OAuthCodeInvalid,

    /// OAuth state parameter is unknown, expired or bound to another provider.
    #[error("invalid OAuth state parameter")]
    OAuthStateInvalid,

    /// Provider path segment did not name a supported provider.
    #[error("unsupported OAuth provider")]
    InvalidOAuthProvider,

    /// Provider is supported but has no client credentials configured.
    #[error("{0} sign-in is not configured")]
    OAuthNotConfigured(String),

    /// Error reported by an upstream identity provider, message kept verbatim.
    #[error("{0}")]
    Provider(String),

    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// Session not found.
    #[error("session not found")]
    SessionNotFound,

    /// Session has expired.
    #[error("session has expired")]
    SessionExpired,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Database operation failed.
    #[error("database error: {0}")]
    DatabaseError(String),

    /// Session storage operation failed.
    #[error("session storage error: {0}")]
    SessionStorage(String),

    /// Serialization of a stored record failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not be exposed to users).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error is due to the caller's input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tasklist_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::DatabaseError("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidCredentials
                | Self::EmailAlreadyInUse
                | Self::WeakPassword { .. }
                | Self::OAuthCodeInvalid
                | Self::OAuthStateInvalid
                | Self::InvalidOAuthProvider
        )
    }

    /// Returns `true` for the silent no-op raised on empty input.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }

    /// Text to show the user for this failure.
    ///
    /// Provider-facing variants surface their message verbatim; system
    /// failures collapse to [`GENERIC_FAILURE`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use tasklist_auth::AuthError;
    /// assert_eq!(
    ///     AuthError::Provider("quota exceeded".into()).user_message(),
    ///     "quota exceeded"
    /// );
    /// assert_eq!(
    ///     AuthError::InternalError("boom".into()).user_message(),
    ///     "something went wrong"
    /// );
    /// ```
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::DatabaseError(_)
            | Self::SessionStorage(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => GENERIC_FAILURE.to_string(),
            Self::Provider(message) if message.trim().is_empty() => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_provider_message_falls_back_to_generic() {
        assert_eq!(AuthError::Provider("  ".into()).user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn user_errors_surface_their_text() {
        assert_eq!(
            AuthError::EmailAlreadyInUse.user_message(),
            "email already in use"
        );
        assert_eq!(
            AuthError::WeakPassword { min_length: 6 }.user_message(),
            "password should be at least 6 characters"
        );
    }

    #[test]
    fn system_errors_are_not_user_errors() {
        assert!(!AuthError::SessionStorage("timeout".into()).is_user_error());
        assert!(AuthError::MissingField("email").is_silent());
        assert!(!AuthError::InvalidCredentials.is_silent());
    }
}
