/// Live session layer.
///
/// - Event protocol (ClientMessage & ServerMessage)
/// - WebSocketServer actor (user -> sessions routing, multi-device)
/// - WebSocketSession actor (one per connection)
/// - HTTP upgrade handler
/// - EventDispatcher (bounded push queue drained by a dedicated worker)
pub mod dispatcher;
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
