use uuid::Uuid;

use crate::{api::error, modules::theater::schema::TheaterEntity};

#[async_trait::async_trait]
pub trait TheaterRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<TheaterEntity>, error::SystemError>;
}
