//! Error types for the room layer.

use locshare_protocol::{ConnectionId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    /// The room does not exist (never created, or already destroyed).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The connection is already a member of this room.
    #[error("{0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// The connection is not a member of this room.
    #[error("{0} not in room {1}")]
    NotInRoom(ConnectionId, RoomId),

    /// The owner cannot leave its own room; it can only destroy it.
    #[error("{0} owns room {1} and cannot leave it")]
    OwnerCannotLeave(ConnectionId, RoomId),

    /// Every generated identifier collided with a live room.
    #[error("no free room id after {0} attempts")]
    IdSpaceExhausted(usize),
}
