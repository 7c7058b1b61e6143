/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// A frame arrived that cannot carry a text event (e.g. non-UTF-8 binary).
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A setting cannot be served (e.g. a WebSocket path that clashes
    /// with the liveness route).
    #[error("invalid transport config: {0}")]
    InvalidConfig(String),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
