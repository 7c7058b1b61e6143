//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into a frame).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed.
    ///
    /// Common causes: malformed JSON, an unknown `event` name, or a
    /// payload missing required fields.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
