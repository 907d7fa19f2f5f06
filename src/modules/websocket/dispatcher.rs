/// Event Dispatcher
///
/// Services never talk to the live transport directly. They submit a `PushTask`
/// to a bounded queue and return; a dedicated worker drains the queue into an
/// `EventSink`. Delivery is best-effort: a full queue, a closed worker or a
/// failing sink only produce a log line, and nothing is retried.
use actix::prelude::*;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::events::SendToUser;
use super::message::ServerMessage;
use super::server::WebSocketServer;

#[derive(thiserror::Error, Debug)]
pub enum PushError {
    #[error("live transport mailbox is full")]
    Full,
    #[error("live transport is not running")]
    Disconnected,
}

/// Where the dispatcher worker hands events off to.
pub trait EventSink: Send + Sync + 'static {
    fn push(&self, user_id: Uuid, message: ServerMessage) -> Result<(), PushError>;
}

impl EventSink for Addr<WebSocketServer> {
    fn push(&self, user_id: Uuid, message: ServerMessage) -> Result<(), PushError> {
        self.try_send(SendToUser { user_id, message }).map_err(|e| match e {
            SendError::Full(_) => PushError::Full,
            SendError::Closed(_) => PushError::Disconnected,
        })
    }
}

#[derive(Debug)]
pub struct PushTask {
    pub user_id: Uuid,
    pub message: ServerMessage,
}

#[derive(Clone)]
pub struct EventDispatcher {
    tx: mpsc::Sender<PushTask>,
}

impl EventDispatcher {
    /// Dispatcher plus the receiving end of its queue; the caller owns the worker.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PushTask>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Dispatcher whose worker runs on the current actix runtime.
    pub fn spawn<S: EventSink>(capacity: usize, sink: S) -> Self {
        let (dispatcher, rx) = Self::channel(capacity);
        actix_web::rt::spawn(run_dispatcher(rx, sink));
        dispatcher
    }

    /// Never blocks and never fails the caller.
    pub fn dispatch(&self, user_id: Uuid, message: ServerMessage) {
        match self.tx.try_send(PushTask { user_id, message }) {
            Ok(()) => {}
            Err(TrySendError::Full(task)) => {
                tracing::warn!("Push queue full, dropping event for user {}", task.user_id);
            }
            Err(TrySendError::Closed(task)) => {
                tracing::warn!("Push worker stopped, dropping event for user {}", task.user_id);
            }
        }
    }
}

pub async fn run_dispatcher<S: EventSink>(mut rx: mpsc::Receiver<PushTask>, sink: S) {
    tracing::info!("Event dispatcher started");

    while let Some(task) = rx.recv().await {
        let user_id = task.user_id;
        if let Err(e) = sink.push(user_id, task.message) {
            tracing::warn!("Push to user {} failed: {}", user_id, e);
        }
    }

    tracing::info!("Event dispatcher stopped");
}
