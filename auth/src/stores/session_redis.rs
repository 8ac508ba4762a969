//! Redis-based session repository.
//!
//! # Architecture
//!
//! - **Session key**: `session:{session_id}` → JSON-serialized `Session`, `EX` = session TTL
//! - **OAuth state key**: `oauth_state:{state}` → JSON-serialized `OAuthState`, `EX` = state TTL
//!
//! # Example
//!
//! ```no_run
//! use tasklist_auth::stores::RedisSessionRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sessions = RedisSessionRepository::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::SessionRepository;
use crate::state::{OAuthState, Session, SessionId};
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Redis-backed sessions with TTL-based expiration.
#[derive(Clone)]
pub struct RedisSessionRepository {
    /// Connection manager (reconnects transparently).
    conn_manager: ConnectionManager,
}

impl RedisSessionRepository {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            AuthError::SessionStorage(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::SessionStorage(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    fn session_key(session_id: SessionId) -> String {
        format!("session:{}", session_id.0)
    }

    fn oauth_state_key(state: &str) -> String {
        format!("oauth_state:{state}")
    }
}

/// Redis `EX` seconds; never zero, since `SET EX 0` is an error.
#[allow(clippy::cast_sign_loss)]
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.num_seconds().max(1) as u64
}

impl SessionRepository for RedisSessionRepository {
    async fn create(&self, session: &Session, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let key = Self::session_key(session.session_id);

        let payload = serde_json::to_string(session)
            .map_err(|e| AuthError::SerializationError(e.to_string()))?;

        // NX: a session id is never reused
        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthError::SessionStorage(format!("Failed to create session: {e}")))?;

        if reply.is_none() {
            return Err(AuthError::SessionStorage(
                "Session ID already exists".to_string(),
            ));
        }

        tracing::debug!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            ttl_seconds = ttl_seconds(ttl),
            "Stored session in Redis"
        );

        Ok(())
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<Session>> {
        let mut conn = self.conn_manager.clone();

        let payload: Option<String> = conn
            .get(Self::session_key(session_id))
            .await
            .map_err(|e| AuthError::SessionStorage(format!("Failed to get session: {e}")))?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let session: Session = serde_json::from_str(&payload)
            .map_err(|e| AuthError::SerializationError(e.to_string()))?;

        // Redis TTL is authoritative, but a PERSISTed key must still expire
        if session.is_expired(chrono::Utc::now()) {
            tracing::warn!(session_id = %session_id, "Expired session outlived its TTL");
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn delete(&self, session_id: SessionId) -> Result<bool> {
        let mut conn = self.conn_manager.clone();

        let removed: u64 = conn
            .del(Self::session_key(session_id))
            .await
            .map_err(|e| AuthError::SessionStorage(format!("Failed to delete session: {e}")))?;

        Ok(removed > 0)
    }

    async fn put_oauth_state(&self, state: &OAuthState, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let payload = serde_json::to_string(state)
            .map_err(|e| AuthError::SerializationError(e.to_string()))?;

        let _: () = conn
            .set_ex(Self::oauth_state_key(&state.state_param), payload, ttl_seconds(ttl))
            .await
            .map_err(|e| AuthError::SessionStorage(format!("Failed to store OAuth state: {e}")))?;

        Ok(())
    }

    async fn take_oauth_state(&self, state_param: &str) -> Result<Option<OAuthState>> {
        let mut conn = self.conn_manager.clone();
        let key = Self::oauth_state_key(state_param);

        // GET and DEL in one transaction so a state is consumed once
        let (payload,): (Option<String>,) = redis::pipe()
            .atomic()
            .get(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthError::SessionStorage(format!("Failed to consume OAuth state: {e}")))?;

        payload
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| AuthError::SerializationError(e.to_string()))
            })
            .transpose()
    }
}
