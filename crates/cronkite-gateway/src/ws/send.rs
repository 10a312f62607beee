use axum::extract::ws::Message;
use futures_util::SinkExt;
use serde::Serialize;

use crate::ws::WsSink;

/// Serialize a frame to JSON and push it down the socket.
pub async fn frame<T: Serialize>(tx: &mut WsSink, payload: &T) -> Result<(), axum::Error> {
    let json = serde_json::to_string(payload).unwrap_or_default();
    tx.send(Message::Text(json.into()))
        .await
        .map_err(axum::Error::new)
}
