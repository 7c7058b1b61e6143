//! Core protocol types for LocShare's wire format.
//!
//! Every frame is adjacently tagged: the event name goes in `"event"`, its
//! payload in `"data"`. Field names are camelCase on the wire to match the
//! browser clients.

use std::fmt;

use locshare_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a live room.
///
/// A short lowercase alphanumeric string chosen by the server. On the wire
/// it is a bare JSON string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps an already-generated identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geographic position. Echoed back verbatim, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// Outcome marker carried by `roomJoined`, `roomLeft`, and `roomDestroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Payload of `createRoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoom {
    pub position: Position,
}

/// Payload of `joinRoom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomId,
}

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Create a room anchored at `position`; the sender becomes its owner.
    CreateRoom(CreateRoom),

    /// Join an existing room by identifier.
    JoinRoom(JoinRoom),

    /// Opaque location payload, relayed as `updateLocationResponse`.
    UpdateLocation(serde_json::Value),

    /// Leave the current room without closing the connection.
    LeaveRoom,
}

impl ClientEvent {
    /// The wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom(_) => "createRoom",
            Self::JoinRoom(_) => "joinRoom",
            Self::UpdateLocation(_) => "updateLocation",
            Self::LeaveRoom => "leaveRoom",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Payload of `connected`: tells a client its own connection id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub user_id: ConnectionId,
}

/// Payload of `roomCreated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: RoomId,
    pub position: Position,
    pub total_connected_users: Vec<ConnectionId>,
}

/// Payload of `userJoinedRoom` and `userLeftRoom`.
///
/// `total_connected_users` is the membership list read after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChange {
    pub user_id: ConnectionId,
    pub total_connected_users: Vec<ConnectionId>,
}

/// Payload of the status-only replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: Status,
}

/// Payload of `error`. `code` follows HTTP conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: u16,
    pub message: String,
}

/// Events the server emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Sent once, right after the connection is registered.
    Connected(Welcome),

    /// Reply to the creator of a room.
    RoomCreated(RoomCreated),

    /// Reply to a `joinRoom` request.
    RoomJoined(StatusReply),

    /// Sent to a room's owner when someone joins.
    UserJoinedRoom(MembershipChange),

    /// Sent to a room's owner when a member leaves or disconnects.
    UserLeftRoom(MembershipChange),

    /// Sent to every member when the owner goes away.
    RoomDestroyed(StatusReply),

    /// Reply to a `leaveRoom` request.
    RoomLeft(StatusReply),

    /// A relayed location payload.
    UpdateLocationResponse(serde_json::Value),

    /// A request could not be processed.
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn room_joined(status: Status) -> Self {
        Self::RoomJoined(StatusReply { status })
    }

    pub fn room_left(status: Status) -> Self {
        Self::RoomLeft(StatusReply { status })
    }

    pub fn room_destroyed() -> Self {
        Self::RoomDestroyed(StatusReply { status: Status::Ok })
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code,
            message: message.into(),
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact JSON shapes, so these tests pin
    //! the serde attributes down.

    use serde_json::json;

    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::from("x1y2z")).unwrap();
        assert_eq!(json, "\"x1y2z\"");
    }

    #[test]
    fn test_room_id_display_is_bare_id() {
        assert_eq!(RoomId::from("abc12").to_string(), "abc12");
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Status::Ok).unwrap(), json!("OK"));
        assert_eq!(
            serde_json::to_value(Status::Error).unwrap(),
            json!("ERROR")
        );
    }

    // =====================================================================
    // ClientEvent
    // =====================================================================

    #[test]
    fn test_client_event_create_room_decodes() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "createRoom",
            "data": { "position": { "lat": 1.0, "lng": 2.0 } }
        }))
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::CreateRoom(CreateRoom {
                position: Position { lat: 1.0, lng: 2.0 }
            })
        );
    }

    #[test]
    fn test_client_event_create_room_accepts_integer_coordinates() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"createRoom","data":{"position":{"lat":1,"lng":2}}}"#,
        )
        .unwrap();
        assert_eq!(event.name(), "createRoom");
    }

    #[test]
    fn test_client_event_join_room_uses_camel_case_field() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "joinRoom",
            "data": { "roomId": "x1y2z" }
        }))
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::JoinRoom(JoinRoom {
                room_id: RoomId::from("x1y2z")
            })
        );
    }

    #[test]
    fn test_client_event_update_location_keeps_payload_opaque() {
        let payload = json!({ "id": "abc", "lat": 3.5, "extra": [1, 2, 3] });
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "updateLocation",
            "data": payload.clone()
        }))
        .unwrap();

        assert_eq!(event, ClientEvent::UpdateLocation(payload));
    }

    #[test]
    fn test_client_event_leave_room_needs_no_data() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"leaveRoom"}"#).unwrap();
        assert_eq!(event, ClientEvent::LeaveRoom);
    }

    #[test]
    fn test_client_event_create_room_missing_position_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event":"createRoom","data":{}}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_server_event_connected_json_format() {
        let value = serde_json::to_value(ServerEvent::Connected(Welcome {
            user_id: conn(4),
        }))
        .unwrap();
        assert_eq!(
            value,
            json!({ "event": "connected", "data": { "userId": 4 } })
        );
    }

    #[test]
    fn test_server_event_room_created_json_format() {
        let value = serde_json::to_value(ServerEvent::RoomCreated(RoomCreated {
            room_id: RoomId::from("x1y2z"),
            position: Position { lat: 1.0, lng: 2.0 },
            total_connected_users: vec![conn(1)],
        }))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "event": "roomCreated",
                "data": {
                    "roomId": "x1y2z",
                    "position": { "lat": 1.0, "lng": 2.0 },
                    "totalConnectedUsers": [1]
                }
            })
        );
    }

    #[test]
    fn test_server_event_user_joined_room_json_format() {
        let change = MembershipChange {
            user_id: conn(2),
            total_connected_users: vec![conn(1), conn(2)],
        };
        let value =
            serde_json::to_value(ServerEvent::UserJoinedRoom(change)).unwrap();

        assert_eq!(
            value,
            json!({
                "event": "userJoinedRoom",
                "data": { "userId": 2, "totalConnectedUsers": [1, 2] }
            })
        );
    }

    #[test]
    fn test_server_event_user_left_room_json_format() {
        let change = MembershipChange {
            user_id: conn(2),
            total_connected_users: vec![conn(1)],
        };
        let value =
            serde_json::to_value(ServerEvent::UserLeftRoom(change)).unwrap();

        assert_eq!(value["event"], "userLeftRoom");
        assert_eq!(value["data"]["totalConnectedUsers"], json!([1]));
    }

    #[test]
    fn test_server_event_status_replies_json_format() {
        assert_eq!(
            serde_json::to_value(ServerEvent::room_joined(Status::Error))
                .unwrap(),
            json!({ "event": "roomJoined", "data": { "status": "ERROR" } })
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::room_destroyed()).unwrap(),
            json!({ "event": "roomDestroyed", "data": { "status": "OK" } })
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::room_left(Status::Ok)).unwrap(),
            json!({ "event": "roomLeft", "data": { "status": "OK" } })
        );
    }

    #[test]
    fn test_server_event_update_location_response_echoes_payload() {
        let payload = json!({ "lat": 1, "lng": 2, "name": "A" });
        let event = ServerEvent::UpdateLocationResponse(payload.clone());
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(
            value,
            json!({ "event": "updateLocationResponse", "data": payload })
        );
    }

    #[test]
    fn test_server_event_error_json_format() {
        let value =
            serde_json::to_value(ServerEvent::error(400, "bad frame")).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "error",
                "data": { "code": 400, "message": "bad frame" }
            })
        );
    }
}
