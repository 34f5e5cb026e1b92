use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendResponse, NewFriendRequest, ReceivedFriendRequest, ReceivedRequestRow},
        rate_limit::SentWindow,
        repository::{FriendRepository, FriendRequestRepository},
        schema::{FriendRequestEntity, FriendRequestStatus},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn are_friends(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM friend_requests
                WHERE status = 'accepted'
                AND (
                    (from_user_id = $1 AND to_user_id = $2)
                    OR (from_user_id = $2 AND to_user_id = $1)
                )
            )
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_friends(
        &self,
        user_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT
                u.id,
                u.email,
                u.first_name,
                u.last_name,
                MIN(fr.responded_at) AS friends_since
            FROM friend_requests fr
            JOIN users u
                ON u.id = CASE
                    WHEN fr.from_user_id = $1 THEN fr.to_user_id
                    ELSE fr.from_user_id
                END
            WHERE fr.status = 'accepted'
              AND (fr.from_user_id = $1 OR fr.to_user_id = $1)
            GROUP BY u.id, u.email, u.first_name, u.last_name
            ORDER BY u.first_name, u.last_name, u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT CASE
                WHEN from_user_id = $1 THEN to_user_id
                ELSE from_user_id
            END)
            FROM friend_requests
            WHERE status = 'accepted'
              AND (from_user_id = $1 OR to_user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    async fn find_pending_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE status = 'pending'
            AND (
                (from_user_id = $1 AND to_user_id = $2)
                OR (from_user_id = $2 AND to_user_id = $1)
            )
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_received_pending(
        &self,
        user_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReceivedFriendRequest>, error::SystemError> {
        let rows = sqlx::query_as::<_, ReceivedRequestRow>(
            r#"
            SELECT
                fr.id AS req_id,
                fr.status,
                fr.created_at,
                u.id AS user_id,
                u.email,
                u.first_name,
                u.last_name
            FROM friend_requests fr
            JOIN users u
                ON fr.from_user_id = u.id
            WHERE fr.to_user_id = $1
              AND fr.status = 'pending'
            ORDER BY fr.created_at DESC, fr.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReceivedFriendRequest::from).collect())
    }

    async fn count_received_pending(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friend_requests WHERE to_user_id = $1 AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn sent_since(
        &self,
        sender_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<SentWindow, error::SystemError> {
        let window = sqlx::query_as::<_, SentWindow>(
            r#"
            SELECT COUNT(*) AS count, MIN(created_at) AS oldest
            FROM friend_requests
            WHERE from_user_id = $1 AND created_at >= $2
            "#,
        )
        .bind(sender_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(window)
    }

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, from_user_id, to_user_id, status, created_at)
            VALUES ($1, $2, $3, 'pending', $4)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.from_user_id)
        .bind(request.to_user_id)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn resolve_pending(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = $2, responded_at = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(status)
        .bind(responded_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}
