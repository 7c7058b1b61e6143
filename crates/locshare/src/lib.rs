//! # LocShare
//!
//! Room-based live location sharing over WebSocket.
//!
//! A client creates a room and becomes its owner; others join by the
//! room's short identifier. The owner hears about every join and leave,
//! and the room disappears the moment the owner leaves. Location updates
//! are relayed as opaque payloads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use locshare::prelude::*;
//!
//! # async fn start() -> Result<(), LocshareError> {
//! let server = LocshareServer::builder()
//!     .config(ServerConfig::default())
//!     .build()
//!     .await?;
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

pub mod cli;
mod config;
mod error;
mod handler;
pub mod logger;
mod server;

pub use config::ServerConfig;
pub use error::LocshareError;
pub use server::{LocshareServer, LocshareServerBuilder};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{LocshareError, LocshareServer, ServerConfig};
    pub use locshare_protocol::{ClientEvent, ConnectionId, RoomId, ServerEvent};
    pub use locshare_session::{HubStats, LocationScope};
}
