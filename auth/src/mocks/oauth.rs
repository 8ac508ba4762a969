//! Mock OAuth2 provider for testing.

use crate::error::{AuthError, Result};
use crate::providers::{OAuth2Provider, OAuthTokenResponse, OAuthUserInfo};
use crate::state::OAuthProvider;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock `OAuth2` provider.
///
/// Serves every provider, accepts any non-empty code and returns the
/// configured user info.
#[derive(Debug, Clone)]
pub struct MockOAuth2Provider {
    /// Whether to simulate success or failure.
    pub should_succeed: bool,
    user_info: Arc<Mutex<OAuthUserInfo>>,
}

impl MockOAuth2Provider {
    /// Create a new mock `OAuth2` provider that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            should_succeed: true,
            user_info: Arc::new(Mutex::new(OAuthUserInfo {
                provider_user_id: "oauth_user_123".to_string(),
                email: Some("oauth@example.com".to_string()),
                name: Some("OAuth User".to_string()),
            })),
        }
    }

    /// Create a mock whose code exchange fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            ..Self::new()
        }
    }

    /// Set the profile returned by `fetch_user_info`.
    pub fn set_user_info(&self, info: OAuthUserInfo) {
        if let Ok(mut guard) = self.user_info.lock() {
            *guard = info;
        }
    }

    /// Extract the `state` query parameter from an authorization URL.
    #[must_use]
    pub fn state_from_url(url: &str) -> Option<String> {
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("state="))
            .map(str::to_string)
    }
}

impl Default for MockOAuth2Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl OAuth2Provider for MockOAuth2Provider {
    fn build_authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
        redirect_uri: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let url = format!(
            "https://{}.example/oauth/authorize?state={state}&redirect_uri={redirect_uri}",
            provider.as_str()
        );

        async move { Ok(url) }
    }

    fn exchange_code(
        &self,
        _provider: OAuthProvider,
        code: &str,
        _redirect_uri: &str,
    ) -> impl Future<Output = Result<OAuthTokenResponse>> + Send {
        let accepted = self.should_succeed && !code.is_empty();

        async move {
            if !accepted {
                return Err(AuthError::OAuthCodeInvalid);
            }

            Ok(OAuthTokenResponse {
                access_token: "mock_access_token_123".to_string(),
                expires_at: None,
            })
        }
    }

    fn fetch_user_info(
        &self,
        _provider: OAuthProvider,
        _access_token: &str,
    ) -> impl Future<Output = Result<OAuthUserInfo>> + Send {
        let user_info = Arc::clone(&self.user_info);

        async move {
            user_info
                .lock()
                .map(|info| info.clone())
                .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))
        }
    }
}
