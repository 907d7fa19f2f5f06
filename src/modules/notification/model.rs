use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::friend::schema::FriendRequestEntity;
use crate::modules::notification::schema::{NotificationExtra, NotificationKind};
use crate::modules::theater::model::TheaterResponse;
use crate::modules::user::model::PublicUser;

pub const DEFAULT_PAGE_SIZE: i64 = 50;

pub struct NewNotification {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub extra: NotificationExtra,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationBody {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[validate(length(min = 1, message = "Recipient id cannot be empty"))]
    pub to_user_id: String,
    /// Either a bare id or a JSON object `{"id": "..."}`.
    #[validate(length(min = 1, message = "Extra cannot be empty"))]
    pub extra: String,
}

#[derive(Deserialize)]
struct ExtraRef {
    id: String,
}

/// Pulls the related entity id out of a client-supplied extra payload.
pub fn parse_extra_id(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if let Ok(id) = Uuid::parse_str(raw) {
        return Some(id);
    }
    let extra: ExtraRef = serde_json::from_str(raw).ok()?;
    Uuid::parse_str(extra.id.trim()).ok()
}

/// Keyset position in the newest-first listing: the `(created_at, id)` of the last item
/// seen. On the wire it is `<RFC 3339 timestamp>_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub id: Uuid,
}

impl PageCursor {
    pub fn encode(&self) -> String {
        format!(
            "{}_{}",
            self.created_at.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            self.id
        )
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (created_at, id) = raw.trim().split_once('_')?;
        let created_at =
            chrono::DateTime::parse_from_rfc3339(created_at).ok()?.with_timezone(&chrono::Utc);
        let id = Uuid::parse_str(id).ok()?;
        Some(PageCursor { created_at, id })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NotificationQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// The entity a notification points at, resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NotificationData {
    FriendRequest(FriendRequestEntity),
    Theater(TheaterResponse),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub from_user: PublicUser,
    pub data: NotificationData,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNotification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub extra: Uuid,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
