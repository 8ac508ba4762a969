//! Authentication endpoints.
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | `/auth/sign-up` | register, sets the session cookie |
//! | POST | `/auth/sign-in` | password sign-in, sets the session cookie |
//! | GET | `/auth/oauth/:provider/authorize` | 302 to Google or GitHub |
//! | GET | `/auth/oauth/:provider/callback` | completes the flow, 303 to `/` |
//! | POST | `/auth/sign-out` | ends the session, clears the cookie |
//! | GET | `/auth/session` | current user or 401 |
//! | PUT | `/auth/profile` | change the display name |
//! | GET | `/sign-in` | sign-in options, 303 to `/` when signed in |

use super::{NoticesBody, UserBody, cleared_session_cookie, resolve_session, session_cookie};
use crate::error::AppError;
use crate::extractors::SessionToken;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tasklist_auth::error::GENERIC_FAILURE;
use tasklist_auth::providers::IdentityProvider;
use tasklist_auth::session::{self, SessionStore};
use tasklist_auth::{AuthActions, OAuthProvider, SessionEnvironment, UserCredential};
use tasklist_core::notify::RecordingNotifier;
use tasklist_tasks::TaskStore;

/// How long a request waits for the Session Store.
const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Sign-up form.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    /// Display name to set on the new account.
    #[serde(default)]
    pub username: String,
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Account password.
    #[serde(default)]
    pub password: String,
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Account password.
    #[serde(default)]
    pub password: String,
}

/// Display-name change.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    /// New display name.
    #[serde(default)]
    pub display_name: String,
}

/// Query string of an OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code.
    #[serde(default)]
    pub code: String,
    /// CSRF state issued by the authorize step.
    #[serde(default)]
    pub state: String,
    /// Set by the provider when the user denied access.
    pub error: Option<String>,
}

/// A freshly opened session.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    /// Session id; also sent as the `session` cookie.
    pub session_id: String,
    /// The signed-in user.
    pub user: UserBody,
    /// Notices produced by the request.
    pub notices: Vec<String>,
}

fn actions<P, S>(state: &AppState<P, S>) -> (AuthActions<P>, RecordingNotifier)
where
    P: IdentityProvider + 'static,
{
    let notifier = RecordingNotifier::new();
    let actions = AuthActions::new(Arc::clone(&state.provider), Arc::new(notifier.clone()));
    (actions, notifier)
}

fn with_session_cookie<P, S>(
    state: &AppState<P, S>,
    credential: &UserCredential,
    mut response: Response,
) -> Response {
    if let Some(cookie) = session_cookie(state, credential.session.session_id) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

fn opened<P, S>(
    state: &AppState<P, S>,
    status: StatusCode,
    credential: UserCredential,
    notices: Vec<String>,
) -> Response {
    let body = SessionBody {
        session_id: credential.session.session_id.to_string(),
        user: UserBody::from(credential.user.clone()),
        notices,
    };
    with_session_cookie(state, &credential, (status, Json(body)).into_response())
}

/// `POST /auth/sign-up`
///
/// # Errors
///
/// - 422 for missing fields or a weak password
/// - 409 if the email is taken
pub async fn sign_up<P, S>(
    State(state): State<AppState<P, S>>,
    Json(request): Json<SignUpRequest>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let (actions, notifier) = actions(&state);
    let credential = actions
        .sign_up(&request.username, &request.email, &request.password)
        .await?;

    metrics::counter!("auth.sign_up.total").increment(1);
    Ok(opened(&state, StatusCode::CREATED, credential, notifier.take()))
}

/// `POST /auth/sign-in`
///
/// # Errors
///
/// - 422 for missing fields
/// - 401 for a wrong email or password
pub async fn sign_in<P, S>(
    State(state): State<AppState<P, S>>,
    Json(request): Json<SignInRequest>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let (actions, notifier) = actions(&state);
    let credential = actions.sign_in(&request.email, &request.password).await?;

    metrics::counter!("auth.sign_in.total", "method" => "password").increment(1);
    Ok(opened(&state, StatusCode::OK, credential, notifier.take()))
}

/// `GET /auth/oauth/:provider/authorize`
///
/// # Errors
///
/// - 400 for an unknown provider
/// - 404 if the provider is not configured
pub async fn oauth_authorize<P, S>(
    State(state): State<AppState<P, S>>,
    Path(provider): Path<String>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let provider: OAuthProvider = provider.parse()?;
    let (actions, _) = actions(&state);
    let url = actions.begin_oauth(provider).await?;

    let location = HeaderValue::from_str(&url)
        .map_err(|e| AppError::internal(GENERIC_FAILURE).with_source(e))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// `GET /auth/oauth/:provider/callback`
///
/// # Errors
///
/// - 400 if the user denied access, or for a bad `state` or `code`
pub async fn oauth_callback<P, S>(
    State(state): State<AppState<P, S>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let provider: OAuthProvider = provider.parse()?;
    if let Some(error) = params.error {
        tracing::warn!(provider = %provider, %error, "OAuth provider returned an error");
        return Err(AppError::bad_request(format!("{provider} sign-in was not completed")));
    }

    let (actions, _) = actions(&state);
    let credential = match provider {
        OAuthProvider::Google => {
            actions
                .sign_in_with_google(&params.code, &params.state)
                .await?
        },
        OAuthProvider::GitHub => {
            actions
                .sign_in_with_github(&params.code, &params.state)
                .await?
        },
    };

    metrics::counter!("auth.sign_in.total", "method" => provider.as_str()).increment(1);
    Ok(with_session_cookie(
        &state,
        &credential,
        Redirect::to("/").into_response(),
    ))
}

/// `POST /auth/sign-out`
///
/// A provider failure is logged and the session stays valid; the cookie is
/// then kept and no notice is returned.
///
/// # Errors
///
/// - 401 without a live session
pub async fn sign_out<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let session = resolve_session(state.provider.as_ref(), token).await?;
    let (Some(session_id), Some(user)) = (session.session_id, session.current_user) else {
        return Err(AppError::unauthorized("not signed in"));
    };

    let notifier = RecordingNotifier::new();
    let store: SessionStore<P> = session::session_store(SessionEnvironment::new(
        Arc::clone(&state.provider),
        Arc::new(notifier.clone()),
    ));
    session::set_user(&store, session_id, user, SESSION_TIMEOUT).await?;

    AuthActions::new(Arc::clone(&state.provider), Arc::new(notifier.clone()))
        .with_session(store.clone())
        .sign_out(session_id)
        .await?;

    let signed_out = store.state(|s| s.current_user.is_none()).await;
    let mut response = Json(NoticesBody {
        notices: notifier.take(),
    })
    .into_response();
    if signed_out {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, cleared_session_cookie());
    }
    Ok(response)
}

/// `GET /auth/session`
///
/// # Errors
///
/// - 401 without a live session
pub async fn current_session<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
) -> Result<Json<UserBody>, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let session_id = token.ok_or_else(|| AppError::unauthorized("not signed in"))?;
    let user = state
        .provider
        .current_user(session_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("not signed in"))?;

    Ok(Json(user.into()))
}

/// `PUT /auth/profile`
///
/// # Errors
///
/// - 401 without a live session
/// - 422 for an empty name
pub async fn update_profile<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<UserBody>, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let session = resolve_session(state.provider.as_ref(), token).await?;
    let user = session
        .current_user
        .ok_or_else(|| AppError::unauthorized("not signed in"))?;

    let (actions, _) = actions(&state);
    let updated = actions
        .update_display_name(&user.id, &request.display_name)
        .await?;

    Ok(Json(updated.into()))
}

/// Where the sign-in page sends its forms.
#[derive(Debug, Serialize)]
pub struct SignInPage {
    /// Password sign-in endpoint.
    pub sign_in: &'static str,
    /// Registration endpoint.
    pub sign_up: &'static str,
    /// OAuth authorize endpoints, by provider.
    pub oauth: Vec<String>,
}

/// `GET /sign-in`
///
/// A visitor who is already signed in is sent to the task list.
///
/// # Errors
///
/// Returns [`AppError`] if the session cannot be resolved.
pub async fn sign_in_page<P, S>(
    State(state): State<AppState<P, S>>,
    SessionToken(token): SessionToken,
) -> Result<Response, AppError>
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    let session = resolve_session(state.provider.as_ref(), token).await?;
    if session.current_user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Json(SignInPage {
        sign_in: "/auth/sign-in",
        sign_up: "/auth/sign-up",
        oauth: [OAuthProvider::Google, OAuthProvider::GitHub]
            .into_iter()
            .map(|provider| format!("/auth/oauth/{provider}/authorize"))
            .collect(),
    })
    .into_response())
}
