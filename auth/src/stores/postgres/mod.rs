//! PostgreSQL storage implementations.
//!
//! - User accounts, including password hashes and OAuth links

pub mod user;

pub use user::PostgresUserRepository;
