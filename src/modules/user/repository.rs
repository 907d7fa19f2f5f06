use uuid::Uuid;

use crate::{api::error, modules::user::schema::UserEntity};

/// Read-only view over the identity subsystem's users.
#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    /// Users that do not exist are silently missing from the result.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;
}
