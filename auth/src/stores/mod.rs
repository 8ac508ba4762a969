//! Storage implementations for the auth system.
//!
//! - **User Repository** (PostgreSQL) - Persistent accounts
//! - **Session Repository** (Redis) - Ephemeral sessions and OAuth states with TTL

pub mod postgres;
pub mod session_redis;

pub use postgres::PostgresUserRepository;
pub use session_redis::RedisSessionRepository;
