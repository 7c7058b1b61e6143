//! Room identifier generation.

use locshare_protocol::RoomId;
use rand::Rng;

/// Characters a generated room identifier is drawn from.
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default identifier length.
pub const DEFAULT_ID_LEN: usize = 5;

/// Produces candidate room identifiers.
///
/// Candidates need not be unique; the registry rejects any that collide
/// with a live room and asks again.
pub trait IdGenerator: Send + 'static {
    /// Returns the next candidate identifier.
    fn generate(&mut self) -> RoomId;
}

/// Short random identifiers over `[0-9a-z]`.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    len: usize,
}

impl RandomIdGenerator {
    /// Creates a generator producing identifiers of `len` characters.
    ///
    /// A length of zero is bumped to one.
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LEN)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&mut self) -> RoomId {
        let mut rng = rand::rng();
        let id: String = (0..self.len)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        RoomId::new(id)
    }
}
