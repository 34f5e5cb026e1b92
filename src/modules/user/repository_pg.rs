use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::InsertUser, repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

/// `%term%` with LIKE metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, email, hash_password, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.hash_password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn search_by_name(
        &self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE is_active
            AND (
                lower(first_name) LIKE lower($1)
                OR lower(last_name) LIKE lower($1)
                OR lower(first_name || ' ' || last_name) LIKE lower($1)
            )
            ORDER BY first_name, last_name, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(term))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn count_by_name(&self, term: &str) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE is_active
            AND (
                lower(first_name) LIKE lower($1)
                OR lower(last_name) LIKE lower($1)
                OR lower(first_name || ' ' || last_name) LIKE lower($1)
            )
            "#,
        )
        .bind(like_pattern(term))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
