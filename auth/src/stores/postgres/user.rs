//! PostgreSQL user repository implementation.
//!
//! Accounts live in the `users` table created by the server migrations.
//! Emails are stored normalized, so lookups are plain equality.
//!
//! # Example
//!
//! ```no_run
//! use tasklist_auth::stores::postgres::PostgresUserRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/tasklist").await?;
//! let repo = PostgresUserRepository::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::{UserRecord, UserRepository};
use crate::state::{OAuthProvider, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const SELECT_USER: &str = r"
    SELECT user_id, email, password_hash, display_name, oauth_provider, oauth_subject, created_at
    FROM users
";

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new PostgreSQL user repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, binds: &[&str]) -> Result<Option<UserRecord>> {
        let sql = format!("{SELECT_USER} WHERE {clause}");
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to get user: {e}")))?;

        row.map(UserRow::into_record).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    email: Option<String>,
    password_hash: Option<String>,
    display_name: Option<String>,
    oauth_provider: Option<String>,
    oauth_subject: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord> {
        let oauth_provider = self
            .oauth_provider
            .as_deref()
            .map(str::parse::<OAuthProvider>)
            .transpose()
            .map_err(|_| {
                AuthError::DatabaseError(format!(
                    "Unknown OAuth provider stored for user {}",
                    self.user_id
                ))
            })?;

        Ok(UserRecord {
            user_id: UserId(self.user_id),
            email: self.email,
            password_hash: self.password_hash,
            display_name: self.display_name,
            oauth_provider,
            oauth_subject: self.oauth_subject,
            created_at: self.created_at,
        })
    }
}

impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        self.fetch_one_where("user_id = $1", &[user_id.as_str()]).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.fetch_one_where("email = $1", &[email]).await
    }

    async fn find_by_oauth(
        &self,
        provider: OAuthProvider,
        subject: &str,
    ) -> Result<Option<UserRecord>> {
        self.fetch_one_where(
            "oauth_provider = $1 AND oauth_subject = $2",
            &[provider.as_str(), subject],
        )
        .await
    }

    async fn create(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO users
                (user_id, email, password_hash, display_name, oauth_provider, oauth_subject, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.user_id.as_str())
        .bind(user.email.as_deref())
        .bind(user.password_hash.as_deref())
        .bind(user.display_name.as_deref())
        .bind(user.oauth_provider.map(|p| p.as_str()))
        .bind(user.oauth_subject.as_deref())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailAlreadyInUse;
                }
            }
            AuthError::DatabaseError(format!("Failed to create user: {e}"))
        })?;

        Ok(())
    }

    async fn link_oauth(
        &self,
        user_id: &UserId,
        provider: OAuthProvider,
        subject: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET oauth_provider = $2, oauth_subject = $3
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .bind(provider.as_str())
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Failed to link OAuth identity: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn set_display_name(&self, user_id: &UserId, display_name: &str) -> Result<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET display_name = $2
            WHERE user_id = $1
            RETURNING user_id, email, password_hash, display_name, oauth_provider, oauth_subject, created_at
            ",
        )
        .bind(user_id.as_str())
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Failed to update display name: {e}")))?
        .ok_or(AuthError::UserNotFound)?;

        row.into_record()
    }
}
