//! Room registry for LocShare.
//!
//! A room is a single entity, [`Room`], holding its identifier, its owner
//! and its members. The [`RoomRegistry`] is the only place rooms live and
//! enforces the authority rule: ownership never transfers, and a room is
//! removed only through [`RoomRegistry::destroy`].
//!
//! # Key types
//!
//! - [`RoomRegistry`]: create / look up / destroy rooms, track membership
//! - [`Room`]: one live room
//! - [`IdGenerator`]: how fresh room identifiers are drawn

mod error;
mod id;
mod registry;
mod room;

pub use error::RoomError;
pub use id::{DEFAULT_ID_LEN, IdGenerator, RandomIdGenerator};
pub use registry::{MAX_ID_ATTEMPTS, RoomRegistry};
pub use room::Room;
