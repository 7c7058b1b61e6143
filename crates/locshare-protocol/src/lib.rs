//! Wire protocol for LocShare.
//!
//! This crate defines what travels over a connection:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Position`], [`RoomId`])
//! - **Codec** ([`Codec`] trait, [`JsonCodec`])
//! - **Errors** ([`ProtocolError`])
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.
//!
//! ```text
//! Transport (text frames) → Protocol (events) → Session (room state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use locshare_transport::ConnectionId;
pub use types::{
    ClientEvent, CreateRoom, ErrorPayload, JoinRoom, MembershipChange, Position,
    RoomCreated, RoomId, Status, StatusReply, ServerEvent, Welcome,
};
