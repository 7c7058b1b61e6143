//! Session handling for LocShare.
//!
//! This crate turns inbound client events into outbound deliveries:
//!
//! 1. **State machine**: [`SessionHandler`] tracks what every connection
//!    is doing ([`SessionState`]) and applies the room protocol rules,
//!    returning the deliveries each event produces. It does no I/O.
//! 2. **Hub**: [`spawn_hub`] runs one `SessionHandler` inside a Tokio
//!    task and fans its deliveries out to per-connection channels. All
//!    room mutation happens on that one task.
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)        ← one task per connection, talks to the hub
//!     ↕
//! Session Layer (this)  ← protocol rules, single writer of room state
//!     ↕
//! Room Layer (below)    ← RoomRegistry
//! ```

mod error;
mod handler;
mod hub;
mod scope;
mod session;

pub use error::SessionError;
pub use handler::{Outbound, SessionHandler};
pub use hub::{
    DEFAULT_HUB_CHANNEL_SIZE, EventSender, HubHandle, HubStats, spawn_hub,
};
pub use scope::LocationScope;
pub use session::SessionState;
