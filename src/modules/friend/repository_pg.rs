use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        repository::FriendRequestRepository,
        schema::{canonical_pair, FriendRequestEntity},
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
impl FriendRequestRepository for FriendRepositoryPg {
    async fn count_between(&self, a: &Uuid, b: &Uuid) -> Result<i64, error::SystemError> {
        let (low, high) = canonical_pair(*a, *b);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM friend_requests
            WHERE LEAST(user_id, friend_id) = $1
              AND GREATEST(user_id, friend_id) = $2
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn find_by_id(
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

    async fn find_for_participant(
        &self,
        request_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE id = $1
              AND (user_id = $2 OR friend_id = $2)
            "#,
        )
        .bind(request_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_accepted_between(
        &self,
        a: &Uuid,
        b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let (low, high) = canonical_pair(*a, *b);

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE LEAST(user_id, friend_id) = $1
              AND GREATEST(user_id, friend_id) = $2
              AND accepted = TRUE
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_pending_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE friend_id = $1
              AND accepted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create(
        &self,
        user_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, user_id, friend_id, accepted)
            VALUES ($1, $2, $3, FALSE)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn mark_accepted(&self, request_id: &Uuid) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE friend_requests
            SET accepted = TRUE, updated_at = NOW()
            WHERE id = $1 AND accepted = FALSE
            "#,
        )
        .bind(request_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }
}
