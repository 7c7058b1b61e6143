//! Integration tests for the room registry through its public API.

use std::collections::HashSet;

use locshare_protocol::{ConnectionId, RoomId};
use locshare_room::{IdGenerator, RandomIdGenerator, RoomError, RoomRegistry};

// =========================================================================
// Helpers
// =========================================================================

fn conn(n: u64) -> ConnectionId {
    ConnectionId::new(n)
}

/// Always returns the same identifier.
struct Constant(&'static str);

impl IdGenerator for Constant {
    fn generate(&mut self) -> RoomId {
        RoomId::from(self.0)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_room_lifecycle_matches_owner_member_flow() {
    let mut reg = RoomRegistry::new();
    let a = conn(1);
    let b = conn(2);

    let id = reg.create(a).unwrap();
    assert_eq!(reg.members(&id).unwrap(), &[a]);

    let room = reg.join(&id, b).unwrap();
    assert_eq!(room.members(), &[a, b]);
    assert_eq!(room.owner(), a);

    let room = reg.leave(&id, b).unwrap();
    assert_eq!(room.members(), &[a]);
    assert!(reg.is_live(&id));

    let gone = reg.destroy(&id).unwrap();
    assert_eq!(gone.id(), &id);
    assert_eq!(gone.into_members(), vec![a]);
    assert!(!reg.is_live(&id));
    assert_eq!(reg.owner_of(&id), None);
    assert!(reg.is_empty());
}

#[test]
fn test_many_creates_yield_distinct_live_ids() {
    let mut reg = RoomRegistry::with_generator(RandomIdGenerator::new(5));
    let mut seen = HashSet::new();

    for n in 0..500 {
        let id = reg.create(conn(n)).unwrap();
        assert!(seen.insert(id), "identifier reissued while live");
    }
    assert_eq!(reg.len(), 500);
}

#[test]
fn test_constant_generator_only_allows_one_live_room() {
    let mut reg = RoomRegistry::with_generator(Constant("x1y2z"));
    let id = reg.create(conn(1)).unwrap();
    assert_eq!(id.as_str(), "x1y2z");

    assert!(matches!(
        reg.create(conn(2)),
        Err(RoomError::IdSpaceExhausted(_))
    ));

    reg.destroy(&id);
    assert_eq!(reg.create(conn(2)).unwrap().as_str(), "x1y2z");
    assert_eq!(reg.owner_of(&id), Some(conn(2)));
}

#[test]
fn test_rooms_are_independent() {
    let mut reg = RoomRegistry::new();
    let first = reg.create(conn(1)).unwrap();
    let second = reg.create(conn(2)).unwrap();
    reg.join(&first, conn(3)).unwrap();

    reg.destroy(&first);

    assert!(reg.is_live(&second));
    let room = reg.get(&second).unwrap();
    assert_eq!(room.id(), &second);
    assert_eq!(room.members(), &[conn(2)]);
    assert!(reg.get(&first).is_none());
}
