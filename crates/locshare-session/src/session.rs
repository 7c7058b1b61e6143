//! Per-connection protocol state.

use locshare_protocol::RoomId;

/// What a connection is currently doing.
///
/// ```text
///                  createRoom
///        +---------------------------> Owner(R)
///        |                                |
///   Unaffiliated <------------------------+  leave / disconnect
///        |     ^                             (room destroyed)
///        |     |
///        |     +--------------------------+  leave / disconnect /
///        |                                |  room destroyed
///        +---------------------------> Member(R)
///                  joinRoom
/// ```
///
/// There is no room-switching transition: creating or joining is only
/// accepted from `Unaffiliated`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Connected, in no room.
    #[default]
    Unaffiliated,

    /// Created room `R` and holds sole authority over it.
    Owner(RoomId),

    /// Joined room `R` owned by another connection.
    Member(RoomId),
}

impl SessionState {
    /// The room this session belongs to, if any.
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Self::Unaffiliated => None,
            Self::Owner(id) | Self::Member(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_returns_id_for_owner_and_member() {
        let id = RoomId::from("abcde");
        assert_eq!(SessionState::Owner(id.clone()).room(), Some(&id));
        assert_eq!(SessionState::Member(id.clone()).room(), Some(&id));
        assert_eq!(SessionState::Unaffiliated.room(), None);
    }

    #[test]
    fn test_default_is_unaffiliated() {
        assert_eq!(SessionState::default(), SessionState::Unaffiliated);
    }
}
