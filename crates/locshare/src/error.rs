//! Unified error type for LocShare.

use locshare_protocol::ProtocolError;
use locshare_room::RoomError;
use locshare_session::SessionError;
use locshare_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum LocshareError {
    /// Bind, send, or receive failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode or decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session hub is unavailable or rejected a connection.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use locshare_protocol::{ConnectionId, RoomId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: LocshareError =
            TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, LocshareError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error() {
        let err: LocshareError =
            SessionError::AlreadyConnected(ConnectionId::new(3)).into();
        assert!(matches!(err, LocshareError::Session(_)));
        assert!(err.to_string().contains("conn-3"));
    }

    #[test]
    fn test_from_room_error() {
        let err: LocshareError =
            RoomError::NotFound(RoomId::from("abcde")).into();
        assert!(matches!(err, LocshareError::Room(_)));
        assert!(err.to_string().contains("abcde"));
    }

    #[test]
    fn test_from_protocol_error() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err: LocshareError = ProtocolError::Decode(source).into();
        assert!(matches!(err, LocshareError::Protocol(_)));
    }
}
