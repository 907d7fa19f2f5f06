use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::schema::FriendRequestEntity;

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Requests for the unordered pair `{a, b}`, in either direction.
    async fn count_between(&self, a: &Uuid, b: &Uuid) -> Result<i64, error::SystemError>;

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// The request, only if `user_id` is its requester or recipient.
    async fn find_for_participant(
        &self,
        request_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_accepted_between(
        &self,
        a: &Uuid,
        b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Unaccepted requests addressed to `user_id`, oldest first.
    async fn find_pending_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    /// Fails with `Conflict` when the pair already has a request.
    async fn create(
        &self,
        user_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Flips a pending request to accepted; returns the number of rows changed.
    async fn mark_accepted(&self, request_id: &Uuid) -> Result<u64, error::SystemError>;
}
