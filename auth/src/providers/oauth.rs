//! OAuth2 provider trait and the per-provider dispatcher.

use super::{GitHubOAuthProvider, GoogleOAuthProvider, OAuthUserInfo};
use crate::error::{AuthError, Result};
use crate::state::OAuthProvider;

/// OAuth2 provider.
///
/// Abstracts the three HTTP steps of the authorization-code flow. The
/// `provider` argument lets one implementation serve several providers;
/// single-provider implementations reject the others with
/// `AuthError::InvalidOAuthProvider`.
pub trait OAuth2Provider: Send + Sync {
    /// Build authorization URL.
    ///
    /// # Returns
    ///
    /// The URL to redirect the user to for authorization.
    ///
    /// # Errors
    ///
    /// Returns error if the provider is not handled or URL construction fails.
    fn build_authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
        redirect_uri: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Exchange authorization code for access token.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Provider rejects the code
    /// - Response is malformed
    fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> impl std::future::Future<Output = Result<OAuthTokenResponse>> + Send;

    /// Fetch user info from provider.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Token is invalid
    /// - Response is malformed
    fn fetch_user_info(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> impl std::future::Future<Output = Result<OAuthUserInfo>> + Send;
}

/// OAuth token response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthTokenResponse {
    /// Access token.
    pub access_token: String,

    /// Expiration timestamp (if provided).
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Routes each call to the configured Google or GitHub client.
///
/// A provider without credentials fails with
/// `AuthError::OAuthNotConfigured`.
#[derive(Clone, Debug, Default)]
pub struct OAuthClients {
    google: Option<GoogleOAuthProvider>,
    github: Option<GitHubOAuthProvider>,
}

impl OAuthClients {
    /// No providers configured.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            google: None,
            github: None,
        }
    }

    /// Enable Google sign-in.
    #[must_use]
    pub fn with_google(mut self, google: GoogleOAuthProvider) -> Self {
        self.google = Some(google);
        self
    }

    /// Enable GitHub sign-in.
    #[must_use]
    pub fn with_github(mut self, github: GitHubOAuthProvider) -> Self {
        self.github = Some(github);
        self
    }

    /// Returns `true` if `provider` has credentials.
    #[must_use]
    pub const fn is_configured(&self, provider: OAuthProvider) -> bool {
        match provider {
            OAuthProvider::Google => self.google.is_some(),
            OAuthProvider::GitHub => self.github.is_some(),
        }
    }

    fn google(&self) -> Result<&GoogleOAuthProvider> {
        self.google
            .as_ref()
            .ok_or_else(|| AuthError::OAuthNotConfigured("Google".to_string()))
    }

    fn github(&self) -> Result<&GitHubOAuthProvider> {
        self.github
            .as_ref()
            .ok_or_else(|| AuthError::OAuthNotConfigured("GitHub".to_string()))
    }
}

impl OAuth2Provider for OAuthClients {
    async fn build_authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        match provider {
            OAuthProvider::Google => {
                self.google()?
                    .build_authorization_url(provider, state, redirect_uri)
                    .await
            },
            OAuthProvider::GitHub => {
                self.github()?
                    .build_authorization_url(provider, state, redirect_uri)
                    .await
            },
        }
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokenResponse> {
        match provider {
            OAuthProvider::Google => self.google()?.exchange_code(provider, code, redirect_uri).await,
            OAuthProvider::GitHub => self.github()?.exchange_code(provider, code, redirect_uri).await,
        }
    }

    async fn fetch_user_info(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<OAuthUserInfo> {
        match provider {
            OAuthProvider::Google => self.google()?.fetch_user_info(provider, access_token).await,
            OAuthProvider::GitHub => self.github()?.fetch_user_info(provider, access_token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_provider_is_rejected() {
        let clients = OAuthClients::new().with_google(GoogleOAuthProvider::new(
            "client".to_string(),
            "secret".to_string(),
        ));

        assert!(clients.is_configured(OAuthProvider::Google));
        assert!(!clients.is_configured(OAuthProvider::GitHub));

        let result = clients
            .build_authorization_url(OAuthProvider::GitHub, "state", "http://localhost/cb")
            .await;
        assert_eq!(
            result,
            Err(AuthError::OAuthNotConfigured("GitHub".to_string()))
        );
    }

    #[tokio::test]
    async fn configured_provider_builds_url() {
        let clients = OAuthClients::new().with_github(GitHubOAuthProvider::new(
            "gh-client".to_string(),
            "gh-secret".to_string(),
        ));

        let url = clients
            .build_authorization_url(OAuthProvider::GitHub, "xyz", "http://localhost/cb")
            .await;
        assert!(url.is_ok_and(|url| url.starts_with("https://github.com/login/oauth/authorize?")));
    }
}
