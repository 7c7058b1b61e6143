//! The room protocol state machine.
//!
//! [`SessionHandler`] owns the [`RoomRegistry`] and every connection's
//! [`SessionState`]. Each entry point consumes one event and returns the
//! deliveries it produced, in the order they must be sent. Nothing here
//! touches a socket, so the whole protocol is testable synchronously.

use std::collections::BTreeMap;

use locshare_protocol::{
    ClientEvent, ConnectionId, MembershipChange, Position, RoomCreated,
    RoomId, ServerEvent, Status, Welcome,
};
use locshare_room::RoomRegistry;

use crate::{LocationScope, SessionError, SessionState};

/// One event addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

/// Applies client events to room state.
///
/// Single writer: callers hold `&mut self` for the duration of one
/// event, so every event runs to completion before the next starts.
#[derive(Debug)]
pub struct SessionHandler {
    rooms: RoomRegistry,
    /// Ordered by id so server-wide fan-out is deterministic.
    sessions: BTreeMap<ConnectionId, SessionState>,
    scope: LocationScope,
}

impl SessionHandler {
    pub fn new(rooms: RoomRegistry, scope: LocationScope) -> Self {
        Self {
            rooms,
            sessions: BTreeMap::new(),
            scope,
        }
    }

    /// Registers a new connection and greets it with its own id.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if `conn` is already
    /// registered.
    pub fn connect(
        &mut self,
        conn: ConnectionId,
    ) -> Result<Vec<Outbound>, SessionError> {
        if self.sessions.contains_key(&conn) {
            return Err(SessionError::AlreadyConnected(conn));
        }
        self.sessions.insert(conn, SessionState::Unaffiliated);
        tracing::info!(
            %conn,
            sessions = self.sessions.len(),
            "session connected"
        );
        Ok(vec![Outbound::new(
            conn,
            ServerEvent::Connected(Welcome { user_id: conn }),
        )])
    }

    /// Applies one client event.
    pub fn handle(
        &mut self,
        conn: ConnectionId,
        event: ClientEvent,
    ) -> Vec<Outbound> {
        if !self.sessions.contains_key(&conn) {
            tracing::warn!(
                %conn,
                event = event.name(),
                "event from unknown connection"
            );
            return Vec::new();
        }
        tracing::debug!(%conn, event = event.name(), "handling event");

        match event {
            ClientEvent::CreateRoom(req) => {
                self.create_room(conn, req.position)
            }
            ClientEvent::JoinRoom(req) => self.join_room(conn, req.room_id),
            ClientEvent::UpdateLocation(payload) => {
                self.update_location(conn, payload)
            }
            ClientEvent::LeaveRoom => self.leave_room(conn),
        }
    }

    /// Tears down a connection's session.
    ///
    /// An owner's departure destroys its room; a member's departure
    /// notifies the owner.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Outbound> {
        let Some(state) = self.sessions.remove(&conn) else {
            tracing::debug!(%conn, "disconnect for unknown connection");
            return Vec::new();
        };
        tracing::info!(
            %conn,
            sessions = self.sessions.len(),
            "session disconnected"
        );

        match state {
            SessionState::Unaffiliated => Vec::new(),
            SessionState::Owner(room_id) => self.destroy_room(&room_id),
            SessionState::Member(room_id) => {
                self.remove_member(conn, &room_id)
            }
        }
    }

    /// The state of a connected session.
    pub fn state(&self, conn: ConnectionId) -> Option<&SessionState> {
        self.sessions.get(&conn)
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Number of connected sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn scope(&self) -> LocationScope {
        self.scope
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    fn create_room(
        &mut self,
        conn: ConnectionId,
        position: Position,
    ) -> Vec<Outbound> {
        if let Some(current) = self.current_room(conn) {
            tracing::warn!(
                %conn,
                room_id = %current,
                "createRoom while already in a room"
            );
            return vec![Outbound::new(
                conn,
                ServerEvent::error(409, format!("already in room {current}")),
            )];
        }

        let room_id = match self.rooms.create(conn) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(%conn, error = %e, "room creation failed");
                return vec![Outbound::new(
                    conn,
                    ServerEvent::error(503, e.to_string()),
                )];
            }
        };
        let members = self.members_of(&room_id);
        self.set_state(conn, SessionState::Owner(room_id.clone()));

        vec![Outbound::new(
            conn,
            ServerEvent::RoomCreated(RoomCreated {
                room_id,
                position,
                total_connected_users: members,
            }),
        )]
    }

    fn join_room(
        &mut self,
        conn: ConnectionId,
        room_id: RoomId,
    ) -> Vec<Outbound> {
        if let Some(current) = self.current_room(conn) {
            tracing::warn!(
                %conn,
                room_id = %current,
                requested = %room_id,
                "joinRoom while already in a room"
            );
            return vec![Outbound::new(
                conn,
                ServerEvent::room_joined(Status::Error),
            )];
        }

        if let Err(e) = self.rooms.join(&room_id, conn) {
            tracing::debug!(%conn, %room_id, error = %e, "join rejected");
            return vec![Outbound::new(
                conn,
                ServerEvent::room_joined(Status::Error),
            )];
        }
        self.set_state(conn, SessionState::Member(room_id.clone()));

        let mut out =
            vec![Outbound::new(conn, ServerEvent::room_joined(Status::Ok))];
        let notice =
            self.notify_owner(&room_id, conn, ServerEvent::UserJoinedRoom);
        out.extend(notice);
        out
    }

    fn update_location(
        &self,
        conn: ConnectionId,
        payload: serde_json::Value,
    ) -> Vec<Outbound> {
        let targets: Vec<ConnectionId> = match self.scope {
            LocationScope::Global => self.sessions.keys().copied().collect(),
            LocationScope::Room => match self.current_room(conn) {
                Some(room_id) => self.members_of(&room_id),
                None => vec![conn],
            },
        };

        targets
            .into_iter()
            .map(|to| {
                Outbound::new(
                    to,
                    ServerEvent::UpdateLocationResponse(payload.clone()),
                )
            })
            .collect()
    }

    fn leave_room(&mut self, conn: ConnectionId) -> Vec<Outbound> {
        let state = self.sessions.get(&conn).cloned().unwrap_or_default();
        let mut out = match state {
            SessionState::Unaffiliated => {
                tracing::debug!(%conn, "leaveRoom outside any room");
                return vec![Outbound::new(
                    conn,
                    ServerEvent::room_left(Status::Error),
                )];
            }
            SessionState::Owner(room_id) => self.destroy_room(&room_id),
            SessionState::Member(room_id) => {
                self.set_state(conn, SessionState::Unaffiliated);
                self.remove_member(conn, &room_id)
            }
        };
        out.insert(0, Outbound::new(conn, ServerEvent::room_left(Status::Ok)));
        out
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Removes a non-owner and tells the owner who is left.
    fn remove_member(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
    ) -> Vec<Outbound> {
        if let Err(e) = self.rooms.leave(room_id, conn) {
            tracing::warn!(%conn, %room_id, error = %e, "member leave failed");
            return Vec::new();
        }
        self.notify_owner(room_id, conn, ServerEvent::UserLeftRoom)
            .into_iter()
            .collect()
    }

    /// Builds the owner's membership notification, with the member list
    /// read after the change.
    fn notify_owner(
        &self,
        room_id: &RoomId,
        user_id: ConnectionId,
        event: fn(MembershipChange) -> ServerEvent,
    ) -> Option<Outbound> {
        let owner = self.rooms.owner_of(room_id)?;
        Some(Outbound::new(
            owner,
            event(MembershipChange {
                user_id,
                total_connected_users: self.members_of(room_id),
            }),
        ))
    }

    /// Destroys a room, telling every member (owner included) and
    /// returning each of them to `Unaffiliated`.
    fn destroy_room(&mut self, room_id: &RoomId) -> Vec<Outbound> {
        let Some(room) = self.rooms.destroy(room_id) else {
            return Vec::new();
        };
        let members = room.into_members();

        for member in &members {
            if let Some(state) = self.sessions.get_mut(member) {
                if state.room() == Some(room_id) {
                    *state = SessionState::Unaffiliated;
                }
            }
        }

        members
            .into_iter()
            .map(|to| Outbound::new(to, ServerEvent::room_destroyed()))
            .collect()
    }

    fn current_room(&self, conn: ConnectionId) -> Option<RoomId> {
        self.sessions
            .get(&conn)
            .and_then(SessionState::room)
            .cloned()
    }

    fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .members(room_id)
            .map(<[ConnectionId]>::to_vec)
            .unwrap_or_default()
    }

    fn set_state(&mut self, conn: ConnectionId, state: SessionState) {
        if let Some(slot) = self.sessions.get_mut(&conn) {
            *slot = state;
        }
    }
}
