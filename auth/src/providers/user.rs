//! User repository trait.

use crate::error::Result;
use crate::state::{OAuthProvider, ProviderUser, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identifier.
    pub user_id: UserId,

    /// Normalized (trimmed, lowercase) email.
    pub email: Option<String>,

    /// bcrypt hash; `None` for accounts created through OAuth.
    pub password_hash: Option<String>,

    /// Profile display name.
    pub display_name: Option<String>,

    /// Linked OAuth provider.
    pub oauth_provider: Option<OAuthProvider>,

    /// Account identifier at the linked OAuth provider.
    pub oauth_subject: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The provider user object handed to callers.
    #[must_use]
    pub fn to_provider_user(&self) -> ProviderUser {
        ProviderUser {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// User account storage.
///
/// Emails are compared in their normalized form; implementations must
/// reject a second account with the same email.
pub trait UserRepository: Send + Sync {
    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns error if the storage request fails.
    fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>>> + Send;

    /// Look up an account by normalized email.
    ///
    /// # Errors
    ///
    /// Returns error if the storage request fails.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>>> + Send;

    /// Look up an account by its OAuth link.
    ///
    /// # Errors
    ///
    /// Returns error if the storage request fails.
    fn find_by_oauth(
        &self,
        provider: OAuthProvider,
        subject: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>>> + Send;

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Email already exists → `AuthError::EmailAlreadyInUse`
    /// - Storage request fails
    fn create(&self, user: &UserRecord) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Attach an OAuth identity to an existing account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AuthError::UserNotFound`
    /// - Storage request fails
    fn link_oauth(
        &self,
        user_id: &UserId,
        provider: OAuthProvider,
        subject: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Overwrite the display name and return the updated account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AuthError::UserNotFound`
    /// - Storage request fails
    fn set_display_name(
        &self,
        user_id: &UserId,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<UserRecord>> + Send;
}
