//! Codec trait and the JSON implementation.
//!
//! The session layer never touches `serde_json` directly; it asks a
//! [`Codec`] to turn events into text frames and back. Swapping the wire
//! format means providing another implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes events to text frames and decodes frames back to events.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed or does
    /// not match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        frame: &str,
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use locshare_protocol::{ClientEvent, Codec, JoinRoom, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let frame = r#"{"event":"joinRoom","data":{"roomId":"x1y2z"}}"#;
/// let event: ClientEvent = codec.decode(frame).unwrap();
/// assert_eq!(
///     event,
///     ClientEvent::JoinRoom(JoinRoom { room_id: RoomId::from("x1y2z") })
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        frame: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
