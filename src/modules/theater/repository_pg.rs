use uuid::Uuid;

use crate::{
    api::error,
    modules::theater::{repository::TheaterRepository, schema::TheaterEntity},
};

#[derive(Clone)]
pub struct TheaterRepositoryPg {
    pool: sqlx::PgPool,
}

impl TheaterRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TheaterRepository for TheaterRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<TheaterEntity>, error::SystemError> {
        let theater = sqlx::query_as::<_, TheaterEntity>("SELECT * FROM theaters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(theater)
    }
}
