//! HTTP request handlers.
//!
//! Handlers are organized by domain; response bodies shared between them
//! live here.

use crate::error::AppError;
use crate::extractors::SESSION_COOKIE;
use crate::state::AppState;
use axum::http::HeaderValue;
use serde::Serialize;
use tasklist_auth::providers::IdentityProvider;
use tasklist_auth::{ProviderUser, SessionId, SessionState, User};

pub mod auth;
pub mod health;
pub mod tasks;

pub use health::health_check;

/// User as returned to clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserBody {
    /// User identifier.
    pub id: String,
    /// Email, if the provider knows it.
    pub email: Option<String>,
    /// Display name, if set.
    pub display_name: Option<String>,
}

impl From<ProviderUser> for UserBody {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.user_id.0,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// Notices produced while handling a request.
#[derive(Debug, Clone, Serialize)]
pub struct NoticesBody {
    /// User-visible notifications, in order.
    pub notices: Vec<String>,
}

/// Resolve `token` into the Session Store value for this request.
///
/// Unknown and expired sessions are anonymous.
///
/// # Errors
///
/// Returns [`AppError`] if the provider cannot be reached.
pub async fn resolve_session<P>(
    provider: &P,
    token: Option<SessionId>,
) -> Result<SessionState, AppError>
where
    P: IdentityProvider,
{
    let Some(session_id) = token else {
        return Ok(SessionState::anonymous());
    };

    Ok(match provider.current_user(session_id).await? {
        Some(user) => SessionState::authenticated(session_id, User::from(user)),
        None => {
            tracing::debug!(session_id = %session_id, "Unknown or expired session");
            SessionState::anonymous()
        },
    })
}

/// `Set-Cookie` value carrying `session_id`.
fn session_cookie<P, S>(state: &AppState<P, S>, session_id: SessionId) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.cookie_max_age.as_secs()
    );
    if state.secure_cookies {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value removing the session cookie.
fn cleared_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
