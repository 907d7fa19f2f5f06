use uuid::Uuid;

use crate::api::error;
use crate::modules::notification::{
    model::{NewNotification, PageCursor},
    schema::NotificationEntity,
};

#[async_trait::async_trait]
pub trait NotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, error::SystemError>;

    async fn create_many(
        &self,
        notifications: &[NewNotification],
    ) -> Result<Vec<NotificationEntity>, error::SystemError>;

    /// Newest first, ordered by `(created_at, id)`. `before` is an exclusive keyset bound.
    async fn find_by_recipient(
        &self,
        to_user_id: &Uuid,
        before: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, error::SystemError>;

    async fn count_unread(&self, to_user_id: &Uuid) -> Result<i64, error::SystemError>;

    async fn mark_read_by_extra(
        &self,
        extra: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<u64, error::SystemError>;

    async fn mark_all_read(&self, to_user_id: &Uuid) -> Result<u64, error::SystemError>;
}
