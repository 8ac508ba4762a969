//! Authentication configuration.
//!
//! Values are supplied by the application (see the server's `Config::from_env`),
//! never hardcoded in the providers.

use crate::state::OAuthProvider;
use chrono::Duration;

/// Password and session policy for the local identity provider.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime after sign-in.
    ///
    /// Default: 24 hours
    pub session_duration: Duration,

    /// Minimum password length accepted at sign-up.
    ///
    /// Default: 6
    pub min_password_length: usize,

    /// bcrypt work factor.
    ///
    /// Default: `bcrypt::DEFAULT_COST`
    pub bcrypt_cost: u32,
}

impl SessionConfig {
    /// Create the default session configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_duration: Duration::hours(24),
            min_password_length: 6,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Set session duration.
    #[must_use]
    pub const fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Set the minimum password length.
    #[must_use]
    pub const fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    /// Set the bcrypt work factor (tests use the minimum of 4).
    #[must_use]
    pub const fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// OAuth2 authorization-code flow configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Base URL for OAuth redirect URIs (e.g., "https://app.example.com").
    ///
    /// Redirect URI will be: `{base_url}/auth/oauth/{provider}/callback`
    pub base_url: String,

    /// CSRF state time-to-live in minutes.
    ///
    /// Default: 5 minutes
    pub state_ttl_minutes: i64,
}

impl OAuthConfig {
    /// Create new OAuth configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for your application (e.g., "https://app.example.com")
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self {
            base_url,
            state_ttl_minutes: 5,
        }
    }

    /// Set CSRF state time-to-live.
    #[must_use]
    pub const fn with_state_ttl(mut self, minutes: i64) -> Self {
        self.state_ttl_minutes = minutes;
        self
    }

    /// CSRF state lifetime as a duration.
    #[must_use]
    pub const fn state_ttl(&self) -> Duration {
        Duration::minutes(self.state_ttl_minutes)
    }

    /// Callback URL registered with `provider`.
    #[must_use]
    pub fn redirect_uri(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/auth/oauth/{}/callback",
            self.base_url.trim_end_matches('/'),
            provider.as_str()
        )
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_uri_ignores_trailing_slash() {
        let config = OAuthConfig::new("https://todo.example.com/".to_string());
        assert_eq!(
            config.redirect_uri(OAuthProvider::GitHub),
            "https://todo.example.com/auth/oauth/github/callback"
        );
    }

    #[test]
    fn defaults() {
        let oauth = OAuthConfig::default();
        assert_eq!(oauth.state_ttl(), Duration::minutes(5));

        let session = SessionConfig::default().with_bcrypt_cost(4);
        assert_eq!(session.session_duration, Duration::hours(24));
        assert_eq!(session.bcrypt_cost, 4);
    }
}
