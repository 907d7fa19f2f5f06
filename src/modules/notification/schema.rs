use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    NewFriend,
    NewTheaterInvite,
}

/// What a notification points at. The kind is implied by the variant, so a
/// notification can never carry an extra of the wrong type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationExtra {
    FriendRequest(Uuid),
    Theater(Uuid),
}

impl NotificationExtra {
    pub fn from_parts(kind: NotificationKind, id: Uuid) -> Self {
        match kind {
            NotificationKind::NewFriend => NotificationExtra::FriendRequest(id),
            NotificationKind::NewTheaterInvite => NotificationExtra::Theater(id),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationExtra::FriendRequest(_) => NotificationKind::NewFriend,
            NotificationExtra::Theater(_) => NotificationKind::NewTheaterInvite,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            NotificationExtra::FriendRequest(id) | NotificationExtra::Theater(id) => *id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub extra: Uuid,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationEntity {
    pub fn extra(&self) -> NotificationExtra {
        NotificationExtra::from_parts(self.kind, self.extra)
    }
}
