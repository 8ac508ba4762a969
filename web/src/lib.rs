//! Axum HTTP shell for the tasklist service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, cookies
//! │  - Session token extraction             │  ← Correlation ids, tracing
//! │  - Response serialization               │
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - SessionReducer, TaskListReducer      │  ← Testable without HTTP
//! │  - AuthActions, TaskRepository          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **Extract** the session token (bearer header or `session` cookie)
//! 2. **Resolve** it into a `SessionState` through the identity provider
//! 3. **Dispatch** controller actions and wait for their effects
//! 4. **Collect** the notices recorded for this request
//! 5. **Map** the result to JSON, a redirect, or an [`AppError`]

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tasklist_auth::providers::IdentityProvider;
use tasklist_tasks::TaskStore;
use tower_http::trace::TraceLayer;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, SESSION_COOKIE, SessionToken};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use state::AppState;

/// Build the application router.
///
/// ```ignore
/// let app = tasklist_web::router(AppState::new(provider, tasks));
/// axum::serve(listener, app).await?;
/// ```
pub fn router<P, S>(state: AppState<P, S>) -> Router
where
    P: IdentityProvider + 'static,
    S: TaskStore + 'static,
{
    use handlers::{auth, health, tasks};

    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/sign-up", post(auth::sign_up::<P, S>))
        .route("/auth/sign-in", post(auth::sign_in::<P, S>))
        .route(
            "/auth/oauth/:provider/authorize",
            get(auth::oauth_authorize::<P, S>),
        )
        .route(
            "/auth/oauth/:provider/callback",
            get(auth::oauth_callback::<P, S>),
        )
        .route("/auth/sign-out", post(auth::sign_out::<P, S>))
        .route("/auth/session", get(auth::current_session::<P, S>))
        .route("/auth/profile", put(auth::update_profile::<P, S>))
        .route("/sign-in", get(auth::sign_in_page::<P, S>))
        .route("/", get(tasks::list::<P, S>))
        .route(
            "/tasks",
            get(tasks::list::<P, S>).post(tasks::create::<P, S>),
        )
        .route(
            "/tasks/:id",
            put(tasks::rename::<P, S>).delete(tasks::delete::<P, S>),
        )
        .route("/tasks/:id/toggle", post(tasks::toggle::<P, S>))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
