//! Error types for the session layer.

use locshare_protocol::ConnectionId;

/// Errors returned by [`HubHandle`](crate::HubHandle) calls.
///
/// Protocol failures are never reported here; clients see those as
/// in-band events.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The hub task has stopped and no longer accepts commands.
    #[error("session hub is not running")]
    HubClosed,

    /// A connection with this id is already registered.
    #[error("{0} is already connected")]
    AlreadyConnected(ConnectionId),
}
