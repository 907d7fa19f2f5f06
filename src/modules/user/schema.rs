use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_state", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserState {
    Offline,
    Online,
    Idle,
    Invisible,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub avatar: Option<String>,
    pub email: String,
    pub state: UserState,
    pub activity_id: Option<Uuid>,
    pub activity: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
