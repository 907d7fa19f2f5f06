use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::model::PublicUser;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestBody {
    #[validate(length(min = 1, message = "Friend id cannot be empty"))]
    pub friend_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFriendRequest {
    pub request_id: Uuid,
    pub friend: PublicUser,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
