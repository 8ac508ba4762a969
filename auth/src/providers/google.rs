//! Google OAuth 2.0 provider implementation.

use crate::error::{AuthError, Result};
use crate::providers::{OAuth2Provider, OAuthTokenResponse, OAuthUserInfo};
use crate::state::OAuthProvider;
use reqwest::Client;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth 2.0 provider.
///
/// # Configuration
///
/// 1. Create OAuth 2.0 credentials in Google Cloud Console
/// 2. Register `{BASE_URL}/auth/oauth/google/callback` as a redirect URI
/// 3. Set `GOOGLE_CLIENT_ID` and `GOOGLE_CLIENT_SECRET`
///
/// # Example
///
/// ```no_run
/// use tasklist_auth::providers::GoogleOAuthProvider;
///
/// let google = GoogleOAuthProvider::new(
///     "your-client-id".to_string(),
///     "your-client-secret".to_string(),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct GoogleOAuthProvider {
    client_id: String,
    client_secret: String,
    http_client: Client,

    /// Scopes to request (default: "openid email profile").
    scopes: Vec<String>,

    /// Show the account chooser even with a single signed-in account.
    ///
    /// Default: true
    select_account: bool,
}

impl GoogleOAuthProvider {
    /// Create a new Google OAuth provider.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            http_client: Client::new(),
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            select_account: true,
        }
    }

    /// Set custom scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Toggle the account chooser prompt.
    #[must_use]
    pub const fn with_select_account(mut self, select_account: bool) -> Self {
        self.select_account = select_account;
        self
    }

    const fn check(provider: OAuthProvider) -> Result<()> {
        match provider {
            OAuthProvider::Google => Ok(()),
            OAuthProvider::GitHub => Err(AuthError::InvalidOAuthProvider),
        }
    }
}

impl OAuth2Provider for GoogleOAuthProvider {
    async fn build_authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        Self::check(provider)?;

        let scope = self.scopes.join(" ");
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
        ];
        if self.select_account {
            params.push(("prompt", "select_account"));
        }

        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::InternalError(format!("Failed to build URL: {e}")))?;

        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokenResponse> {
        Self::check(provider)?;

        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(body = %body, "Google token exchange failed");
            return Err(AuthError::OAuthCodeInvalid);
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let expires_at = token
            .expires_in
            .map(|secs| chrono::Utc::now() + chrono::Duration::seconds(i64::from(secs)));

        Ok(OAuthTokenResponse {
            access_token: token.access_token,
            expires_at,
        })
    }

    async fn fetch_user_info(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<OAuthUserInfo> {
        Self::check(provider)?;

        let response = self
            .http_client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(body = %body, "Google UserInfo request failed");
            return Err(AuthError::Provider("Google user info request failed".to_string()));
        }

        let user: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        // Unverified addresses are not used for account linking
        let email = user.email.filter(|_| user.email_verified.unwrap_or(false));

        Ok(OAuthUserInfo {
            provider_user_id: user.sub,
            email,
            name: user.name,
        })
    }
}

/// Google's token endpoint response format.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,

    /// Token expiration in seconds (typically 3600).
    expires_in: Option<u32>,
}

/// Google's UserInfo endpoint response format.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    /// Stable Google account id.
    sub: String,
    name: Option<String>,
    email: Option<String>,
    email_verified: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn provider() -> GoogleOAuthProvider {
        GoogleOAuthProvider::new("test_client_id".to_string(), "test_secret".to_string())
    }

    #[tokio::test]
    async fn test_authorization_url() {
        let url = provider()
            .build_authorization_url(
                OAuthProvider::Google,
                "test_state_123",
                "http://localhost:3000/auth/oauth/google/callback",
            )
            .await
            .unwrap();

        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Foauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("state=test_state_123"));
        assert!(url.contains("prompt=select_account"));
    }

    #[tokio::test]
    async fn test_custom_scopes_without_prompt() {
        let url = provider()
            .with_scopes(vec!["openid".to_string(), "email".to_string()])
            .with_select_account(false)
            .build_authorization_url(OAuthProvider::Google, "s", "http://localhost/cb")
            .await
            .unwrap();

        assert!(url.contains("scope=openid+email&"));
        assert!(!url.contains("prompt="));
    }

    #[tokio::test]
    async fn test_wrong_provider_returns_error() {
        let google = provider();

        let url = google
            .build_authorization_url(OAuthProvider::GitHub, "state", "http://localhost/cb")
            .await;
        assert!(matches!(url, Err(AuthError::InvalidOAuthProvider)));

        let token = google
            .exchange_code(OAuthProvider::GitHub, "code", "http://localhost/cb")
            .await;
        assert!(matches!(token, Err(AuthError::InvalidOAuthProvider)));

        let info = google.fetch_user_info(OAuthProvider::GitHub, "token").await;
        assert!(matches!(info, Err(AuthError::InvalidOAuthProvider)));
    }

    #[test]
    fn test_userinfo_parsing_drops_unverified_email() {
        let raw = r#"{"sub":"1101","name":"Ana","email":"ana@example.com","email_verified":false}"#;
        let user: GoogleUserInfo = serde_json::from_str(raw).unwrap();

        assert_eq!(user.sub, "1101");
        assert_eq!(user.email_verified, Some(false));
    }
}
