use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::notification::{
        model::{NewNotification, PageCursor},
        repository::NotificationRepository, schema::NotificationEntity,
    },
};

#[derive(Clone)]
pub struct NotificationRepositoryPg {
    pool: sqlx::PgPool,
}

impl NotificationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationRepositoryPg {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, error::SystemError> {
        let created = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (id, type, read, from_user_id, to_user_id, extra)
            VALUES ($1, $2, FALSE, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(notification.extra.kind())
        .bind(notification.from_user_id)
        .bind(notification.to_user_id)
        .bind(notification.extra.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn create_many(
        &self,
        notifications: &[NewNotification],
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        if notifications.is_empty() {
            return Ok(vec![]);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO notifications (id, type, read, from_user_id, to_user_id, extra) ",
        );
        builder.push_values(notifications, |mut row, n| {
            row.push_bind(Uuid::now_v7())
                .push_bind(n.extra.kind())
                .push_bind(false)
                .push_bind(n.from_user_id)
                .push_bind(n.to_user_id)
                .push_bind(n.extra.id());
        });
        builder.push(" RETURNING *");

        let created =
            builder.build_query_as::<NotificationEntity>().fetch_all(&self.pool).await?;

        Ok(created)
    }

    async fn find_by_recipient(
        &self,
        to_user_id: &Uuid,
        before: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        let notifications = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT *
            FROM notifications
            WHERE to_user_id = $1
              AND ($2::timestamptz IS NULL OR (created_at, id) < ($2::timestamptz, $3::uuid))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(to_user_id)
        .bind(before.map(|c| c.created_at))
        .bind(before.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn count_unread(&self, to_user_id: &Uuid) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE to_user_id = $1 AND read = FALSE",
        )
        .bind(to_user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_read_by_extra(
        &self,
        extra: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = NOW(), updated_at = NOW()
            WHERE extra = $1 AND to_user_id = $2 AND read = FALSE
            "#,
        )
        .bind(extra)
        .bind(to_user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }

    async fn mark_all_read(&self, to_user_id: &Uuid) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = NOW(), updated_at = NOW()
            WHERE to_user_id = $1 AND read = FALSE
            "#,
        )
        .bind(to_user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }
}
