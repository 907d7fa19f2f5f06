/// WebSocket Server Actor
///
/// Owns the routing table from users to their connected sessions. A user may be
/// connected from several devices at once; every push goes to all of them.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;

pub struct WebSocketServer {
    /// session_id -> session actor address
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,

    /// user_id -> session_ids
    users: HashMap<Uuid, HashSet<Uuid>>,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), users: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        // pushes arrive in bursts from the dispatcher worker
        ctx.set_mailbox_capacity(1024);
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);

        let mut user_to_remove: Option<Uuid> = None;
        for (&user_id, sessions) in self.users.iter_mut() {
            if sessions.remove(&msg.id) {
                if sessions.is_empty() {
                    user_to_remove = Some(user_id);
                }
                break;
            }
        }

        if let Some(user_id) = user_to_remove {
            self.users.remove(&user_id);
            tracing::info!("User {} fully disconnected (no more sessions)", user_id);
        }
    }
}

impl Handler<Authenticate> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Authenticate, _: &mut Context<Self>) {
        let sessions = self.users.entry(msg.user_id).or_default();
        sessions.insert(msg.session_id);

        tracing::info!(
            "User {} authenticated on session {} ({} active session(s))",
            msg.user_id,
            msg.session_id,
            sessions.len()
        );
    }
}

impl Handler<SendToUser> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUser, _: &mut Context<Self>) {
        if let Some(session_ids) = self.users.get(&msg.user_id) {
            for session_id in session_ids {
                self.send_to_session(session_id, msg.message.clone());
            }
            tracing::debug!("Sent message to user {} ({} sessions)", msg.user_id, session_ids.len());
        } else {
            tracing::debug!("User {} not online, message not sent", msg.user_id);
        }
    }
}

impl Message for ServerMessage {
    type Result = ();
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}
