//! The room entity.

use locshare_protocol::{ConnectionId, RoomId};

/// A live room: one owner plus every connection that joined it.
///
/// `members` keeps join order and always starts with the owner, so it
/// can be sent to clients as-is for `totalConnectedUsers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    owner: ConnectionId,
    members: Vec<ConnectionId>,
}

impl Room {
    pub(crate) fn new(id: RoomId, owner: ConnectionId) -> Self {
        Self {
            id,
            owner,
            members: vec![owner],
        }
    }

    /// The room's identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The connection that created the room. Never changes.
    pub fn owner(&self) -> ConnectionId {
        self.owner
    }

    /// Current members in join order, owner first.
    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    /// Whether `conn` is currently in the room.
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }

    /// Consumes the room, returning its member list.
    pub fn into_members(self) -> Vec<ConnectionId> {
        self.members
    }

    pub(crate) fn add(&mut self, conn: ConnectionId) -> bool {
        if self.contains(conn) {
            return false;
        }
        self.members.push(conn);
        true
    }

    pub(crate) fn remove(&mut self, conn: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != conn);
        self.members.len() != before
    }
}
