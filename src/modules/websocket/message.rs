/// Live event protocol exchanged with connected clients.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::notification::schema::NotificationKind;
use crate::modules::user::model::PublicUser;

/// Messages sent by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Bind this connection to a user with an access token
    #[serde(rename_all = "camelCase")]
    Auth { token: String },

    Ping,
}

/// Messages pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    /// A notification was stored for this user; clients re-fetch the listing.
    #[serde(rename_all = "camelCase")]
    NewNotification { notification_id: Uuid, kind: NotificationKind },

    /// Sent to the accepting user's own sessions.
    #[serde(rename_all = "camelCase")]
    SelfFriendRequestAccepted { request_id: Uuid, friend_id: Uuid },

    /// Sent to the other participant of the accepted request.
    #[serde(rename_all = "camelCase")]
    FriendRequestAccepted { request_id: Uuid, friend: PublicUser },

    Pong,

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}
