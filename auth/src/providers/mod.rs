//! Authentication providers.
//!
//! Traits for every external dependency of the auth system, plus the
//! concrete implementations used in production.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ SessionReducer / Actions │  depends on IdentityProvider only
//! └────────────┬─────────────┘
//!              ▼
//! ┌──────────────────────────┐
//! │ LocalIdentityProvider    │  bcrypt passwords, sessions, OAuth linking
//! └──┬──────────┬─────────┬──┘
//!    ▼          ▼         ▼
//! UserRepository  SessionRepository  OAuth2Provider
//! (PostgreSQL)    (Redis)            (Google, GitHub)
//! ```
//!
//! Every trait has an in-memory counterpart in [`crate::mocks`].

use serde::{Deserialize, Serialize};

pub mod github;
pub mod google;
pub mod identity;
pub mod local;
pub mod oauth;
pub mod session;
pub mod user;

pub use github::GitHubOAuthProvider;
pub use google::GoogleOAuthProvider;
pub use identity::IdentityProvider;
pub use local::LocalIdentityProvider;
pub use oauth::{OAuth2Provider, OAuthClients, OAuthTokenResponse};
pub use session::SessionRepository;
pub use user::{UserRecord, UserRepository};

/// User information returned by an OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    /// Provider's stable identifier for the account (`sub` or numeric id).
    pub provider_user_id: String,

    /// Primary email, if the provider shares one.
    pub email: Option<String>,

    /// Display name from the provider profile.
    pub name: Option<String>,
}
