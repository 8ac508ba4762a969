//! Error types for web handlers.
//!
//! [`AppError`] is the only error type handlers return. Domain errors convert
//! into it, keeping their user-facing text and choosing the status code.
//!
//! ```json
//! { "code": "UNAUTHORIZED", "message": "invalid email or password" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use tasklist_auth::AuthError;
use tasklist_auth::error::GENERIC_FAILURE;
use tasklist_runtime::StoreError;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Body>, AppError> {
///     let user = provider.current_user(id).await?
///         .ok_or_else(|| AppError::unauthorized("not signed in"))?;
///     Ok(Json(user.into()))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Bad request (400).
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Unauthorized (401).
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// Conflict (409).
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, "CONFLICT")
    }

    /// Validation failure (422).
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message,
            "VALIDATION_ERROR",
        )
    }

    /// The work did not finish in time (504).
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message, "TIMEOUT")
    }

    /// Internal server error (500).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// Service unavailable (503).
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message,
            "SERVICE_UNAVAILABLE",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(GENERIC_FAILURE).with_source(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.user_message();
        match err {
            AuthError::MissingField(_) | AuthError::WeakPassword { .. } => {
                Self::validation(err.to_string())
            },
            AuthError::InvalidCredentials
            | AuthError::UserNotFound
            | AuthError::SessionNotFound
            | AuthError::SessionExpired => Self::unauthorized(message),
            AuthError::EmailAlreadyInUse => Self::conflict(message),
            AuthError::OAuthCodeInvalid
            | AuthError::OAuthStateInvalid
            | AuthError::InvalidOAuthProvider
            | AuthError::Provider(_) => Self::bad_request(message),
            AuthError::OAuthNotConfigured(_) => Self::new(
                StatusCode::NOT_FOUND,
                err.to_string(),
                "OAUTH_NOT_CONFIGURED",
            ),
            AuthError::DatabaseError(_)
            | AuthError::SessionStorage(_)
            | AuthError::SerializationError(_)
            | AuthError::InternalError(_) => Self::unavailable(message).with_source(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout | StoreError::ShutdownTimeout(_) => {
                Self::timeout(GENERIC_FAILURE).with_source(err)
            },
            StoreError::ShutdownInProgress => {
                Self::unavailable(GENERIC_FAILURE).with_source(err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn wrong_password_is_unauthorized_with_provider_text() {
        let err = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "[UNAUTHORIZED] invalid email or password");
    }

    #[test]
    fn storage_failures_hide_details() {
        let err = AppError::from(AuthError::SessionStorage("redis down".to_string()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "[SERVICE_UNAVAILABLE] something went wrong");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let err = AppError::from(AuthError::EmailAlreadyInUse);
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn store_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(StoreError::Timeout);
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
