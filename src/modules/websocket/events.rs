/// Messages exchanged between session actors and the server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::WebSocketSession;

/// A connection was opened
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

/// A connection was closed
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// A connection proved which user it belongs to
#[derive(Message)]
#[rtype(result = "()")]
pub struct Authenticate {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

/// Deliver to every session of one user
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendToUser {
    pub user_id: Uuid,
    pub message: ServerMessage,
}

/// The socket behind a session is gone
#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseSession;
