//! WebSocket control surface: connection lifecycle, authentication, method
//! dispatch, and event fan-out to every connected client.

pub mod broadcast;
pub mod connection;
pub mod dispatch;
pub mod handlers;
pub mod handshake;
pub mod message;
pub mod send;

/// Write half of a split WS connection.
pub type WsSink =
    futures_util::stream::SplitSink<axum::extract::ws::WebSocket, axum::extract::ws::Message>;
