use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use identra_application::UserRepository;
use identra_core::{AppError, AppResult};
use identra_domain::User;

/// PostgreSQL-backed lookup for JWT subject resolution.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|query_error| {
            AppError::Internal(format!("failed to look up user by username: {query_error}"))
        })?;

        Ok(row.map(|row| User::new(row.id.to_string(), row.username)))
    }
}
