//! Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation id
//! - [`SessionToken`]: the session id from `Authorization: Bearer` or the
//!   `session` cookie

use crate::middleware::parse_correlation_id;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tasklist_auth::SessionId;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Correlation ID for the request.
///
/// Set by [`crate::middleware::correlation_id_layer`]; without the layer it is
/// read from the `X-Correlation-ID` header or generated.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| parse_correlation_id(&parts.headers))
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Session the client presented, if any.
///
/// A malformed token is treated as no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(pub Option<SessionId>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_from_headers(&parts.headers)))
    }
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = bearer {
        return SessionId::parse(token);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn token(req: Request<()>) -> SessionToken {
        let (mut parts, _) = req.into_parts();
        SessionToken::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let req = Request::builder()
            .header("X-Correlation-ID", uuid.to_string())
            .body(())
            .unwrap();

        let (mut parts, _) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn bearer_token_wins_over_cookie() {
        let bearer = SessionId::new();
        let req = Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .header(header::COOKIE, format!("session={}", SessionId::new()))
            .body(())
            .unwrap();

        assert_eq!(token(req).await, SessionToken(Some(bearer)));
    }

    #[tokio::test]
    async fn session_cookie_among_others() {
        let id = SessionId::new();
        let req = Request::builder()
            .header(header::COOKIE, format!("theme=dark; session={id}; lang=en"))
            .body(())
            .unwrap();

        assert_eq!(token(req).await, SessionToken(Some(id)));
    }

    #[tokio::test]
    async fn malformed_or_missing_token_is_none() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer not-a-session")
            .body(())
            .unwrap();
        assert_eq!(token(req).await, SessionToken(None));

        let req = Request::builder().body(()).unwrap();
        assert_eq!(token(req).await, SessionToken(None));
    }
}
