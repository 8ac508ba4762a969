//! GitHub OAuth provider implementation.

use crate::error::{AuthError, Result};
use crate::providers::{OAuth2Provider, OAuthTokenResponse, OAuthUserInfo};
use crate::state::OAuthProvider;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";

/// The GitHub API rejects requests without a user agent.
const API_USER_AGENT: &str = "tasklist-auth";

/// GitHub OAuth App provider.
///
/// Register an OAuth App with callback `{BASE_URL}/auth/oauth/github/callback`
/// and set `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET`.
#[derive(Clone, Debug)]
pub struct GitHubOAuthProvider {
    client_id: String,
    client_secret: String,
    http_client: Client,
    scopes: Vec<String>,
}

impl GitHubOAuthProvider {
    /// Create a new GitHub OAuth provider.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            http_client: Client::new(),
            scopes: vec!["read:user".to_string(), "user:email".to_string()],
        }
    }

    /// Set custom scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    const fn check(provider: OAuthProvider) -> Result<()> {
        match provider {
            OAuthProvider::GitHub => Ok(()),
            OAuthProvider::Google => Err(AuthError::InvalidOAuthProvider),
        }
    }

    /// Primary verified address, for accounts that keep their email private.
    async fn primary_email(&self, access_token: &str) -> Result<Option<String>> {
        let response = self
            .http_client
            .get(EMAILS_URL)
            .bearer_auth(access_token)
            .header(USER_AGENT, API_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "GitHub email lookup failed");
            return Ok(None);
        }

        let emails: Vec<GitHubEmail> = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email))
    }
}

impl OAuth2Provider for GitHubOAuthProvider {
    async fn build_authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        Self::check(provider)?;

        let scope = self.scopes.join(" ");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("allow_signup", "true"),
        ];

        let query = serde_urlencoded::to_string(params)
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
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(TOKEN_URL)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(body = %body, "GitHub token exchange failed");
            return Err(AuthError::OAuthCodeInvalid);
        }

        // GitHub reports a bad code with 200 and an `error` field
        let token: GitHubTokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match (token.access_token, token.error) {
            (Some(access_token), None) => Ok(OAuthTokenResponse {
                access_token,
                expires_at: None,
            }),
            (_, error) => {
                tracing::warn!(
                    error = ?error,
                    description = ?token.error_description,
                    "GitHub rejected authorization code"
                );
                Err(token
                    .error_description
                    .map_or(AuthError::OAuthCodeInvalid, AuthError::Provider))
            },
        }
    }

    async fn fetch_user_info(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<OAuthUserInfo> {
        Self::check(provider)?;

        let response = self
            .http_client
            .get(USER_URL)
            .bearer_auth(access_token)
            .header(USER_AGENT, API_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(body = %body, "GitHub user request failed");
            return Err(AuthError::Provider("GitHub user request failed".to_string()));
        }

        let user: GitHubUser = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let email = match user.email {
            Some(email) => Some(email),
            None => self.primary_email(access_token).await?,
        };

        Ok(OAuthUserInfo {
            provider_user_id: user.id.to_string(),
            email,
            name: user.name.or(Some(user.login)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GitHubTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_authorization_url() {
        let github = GitHubOAuthProvider::new("gh_id".to_string(), "gh_secret".to_string());

        let url = github
            .build_authorization_url(OAuthProvider::GitHub, "abc", "http://localhost:3000/cb")
            .await
            .unwrap();

        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=gh_id"));
        assert!(url.contains("scope=read%3Auser+user%3Aemail"));
        assert!(url.contains("state=abc"));
        assert!(!url.contains("gh_secret"));
    }

    #[tokio::test]
    async fn test_wrong_provider_returns_error() {
        let github = GitHubOAuthProvider::new("id".to_string(), "secret".to_string());

        let result = github
            .exchange_code(OAuthProvider::Google, "code", "http://localhost/cb")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidOAuthProvider)));
    }

    #[test]
    fn test_token_error_payload() {
        let raw = r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#;
        let token: GitHubTokenResponse = serde_json::from_str(raw).unwrap();

        assert!(token.access_token.is_none());
        assert_eq!(token.error.as_deref(), Some("bad_verification_code"));
    }

    #[test]
    fn test_user_payload_without_email() {
        let raw = r#"{"id":583231,"login":"octocat","name":null,"email":null}"#;
        let user: GitHubUser = serde_json::from_str(raw).unwrap();

        assert_eq!(user.id, 583_231);
        assert!(user.email.is_none());
    }
}
