//! The room registry: every live room, keyed by identifier.

use std::collections::HashMap;

use locshare_protocol::{ConnectionId, RoomId};

use crate::{IdGenerator, RandomIdGenerator, Room, RoomError};

/// How many candidate identifiers `create` draws before giving up.
pub const MAX_ID_ATTEMPTS: usize = 32;

/// Owns every live room.
///
/// The registry is a plain single-writer structure. It performs no
/// locking; whoever holds `&mut RoomRegistry` is the only writer.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    ids: Box<dyn IdGenerator>,
}

impl RoomRegistry {
    /// Creates an empty registry with the default identifier generator.
    pub fn new() -> Self {
        Self::with_generator(RandomIdGenerator::default())
    }

    /// Creates an empty registry that draws identifiers from `ids`.
    pub fn with_generator(ids: impl IdGenerator) -> Self {
        Self {
            rooms: HashMap::new(),
            ids: Box::new(ids),
        }
    }

    /// Creates a room owned by `owner` and returns its identifier.
    ///
    /// The owner is the room's first member.
    ///
    /// # Errors
    /// Returns [`RoomError::IdSpaceExhausted`] if every candidate drawn
    /// collided with a live room.
    pub fn create(&mut self, owner: ConnectionId) -> Result<RoomId, RoomError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            if self.rooms.contains_key(&id) {
                tracing::debug!(
                    room_id = %id,
                    attempt,
                    "room id collision, retrying"
                );
                continue;
            }
            self.rooms.insert(id.clone(), Room::new(id.clone(), owner));
            tracing::info!(room_id = %id, %owner, "room created");
            return Ok(id);
        }
        tracing::warn!(%owner, attempts = MAX_ID_ATTEMPTS, "no free room id");
        Err(RoomError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }

    /// Returns the owner of a live room.
    pub fn owner_of(&self, id: &RoomId) -> Option<ConnectionId> {
        self.get(id).map(Room::owner)
    }

    /// Whether a room with this identifier currently exists.
    pub fn is_live(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    /// Removes a room, returning it. Destroying an absent room is a no-op.
    pub fn destroy(&mut self, id: &RoomId) -> Option<Room> {
        let removed = self.rooms.remove(id);
        if let Some(room) = &removed {
            tracing::info!(
                room_id = %room.id(),
                members = room.members().len(),
                "room destroyed"
            );
        }
        removed
    }

    /// Adds `conn` to a live room.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if the room is not live
    /// - [`RoomError::AlreadyInRoom`] if `conn` is already a member
    pub fn join(
        &mut self,
        id: &RoomId,
        conn: ConnectionId,
    ) -> Result<&Room, RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        if !room.add(conn) {
            return Err(RoomError::AlreadyInRoom(conn, id.clone()));
        }
        tracing::info!(room_id = %id, %conn, "joined room");
        Ok(room)
    }

    /// Removes a non-owner member from a live room.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if the room is not live
    /// - [`RoomError::OwnerCannotLeave`] if `conn` owns the room
    /// - [`RoomError::NotInRoom`] if `conn` is not a member
    pub fn leave(
        &mut self,
        id: &RoomId,
        conn: ConnectionId,
    ) -> Result<&Room, RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        if room.owner() == conn {
            return Err(RoomError::OwnerCannotLeave(conn, id.clone()));
        }
        if !room.remove(conn) {
            return Err(RoomError::NotInRoom(conn, id.clone()));
        }
        tracing::info!(room_id = %id, %conn, "left room");
        Ok(room)
    }

    /// Members of a live room in join order, owner first.
    pub fn members(&self, id: &RoomId) -> Option<&[ConnectionId]> {
        self.get(id).map(Room::members)
    }

    /// Looks up a live room.
    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.rooms.len())
            .finish_non_exhaustive()
    }
}
