//! `cronkite-protocol` — WebSocket wire format shared by the gateway and its
//! UI clients.
//!
//! # Frame shapes
//!
//! | Frame   | Direction       | Wire discriminator                        |
//! |---------|-----------------|-------------------------------------------|
//! | `REQ`   | client → server | `{ "type": "req", "id", "method", ... }`  |
//! | `RES`   | server → client | `{ "type": "res", "id", "ok", ... }`      |
//! | `EVENT` | server → client | `{ "type": "event", "event", "seq", ... }`|
//!
//! The first `REQ` on a socket must be `connect` ([`handshake::ConnectParams`]);
//! the server answers with [`handshake::HelloOk`] carrying a state snapshot.
//! Everything else is rejected until that exchange completes.

pub mod frames;
pub mod handshake;
pub mod methods;

pub use frames::{ErrorShape, EventFrame, InboundFrame, ReqFrame, ResFrame};
pub use handshake::{AuthPayload, ClientInfo, ConnectParams, HelloOk, ServerInfo};
