use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Orders a pair of user ids so that `{a, b}` and `{b, a}` map to the same key.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestEntity {
    pub id: Uuid,
    /// requester
    pub user_id: Uuid,
    /// recipient
    pub friend_id: Uuid,
    pub accepted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestEntity {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.friend_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.friend_id == user_id {
            self.user_id
        } else {
            self.friend_id
        }
    }
}
