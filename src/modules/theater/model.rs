use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::theater::schema::TheaterEntity;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TheaterResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TheaterEntity> for TheaterResponse {
    fn from(theater: TheaterEntity) -> Self {
        TheaterResponse {
            id: theater.id,
            owner_id: theater.user_id,
            title: theater.title,
            hash: theater.hash,
            created_at: theater.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteBody {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 friends can be invited"))]
    pub friend_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub invited: Vec<Uuid>,
}
