//! WebSocket transport hosted on `axum`.
//!
//! One TCP listener serves both the plain-HTTP liveness route and the
//! WebSocket upgrade route. Upgraded sockets are handed to
//! [`WebSocketTransport::accept`] through a bounded channel, so callers
//! see the same accept loop shape regardless of how the HTTP side is
//! wired.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc, watch};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Settings for the HTTP side of the transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Route that accepts WebSocket upgrades.
    pub ws_path: String,

    /// Body returned by `GET /`.
    pub greeting: String,

    /// How many upgraded connections may wait for `accept()` before the
    /// upgrade handlers start waiting.
    pub accept_backlog: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ws_path: "/ws".to_string(),
            greeting: "Welcome to LocShare".to_string(),
            accept_backlog: 128,
        }
    }
}

/// State shared by the axum route handlers.
#[derive(Clone)]
struct AcceptState {
    incoming: mpsc::Sender<WebSocketConnection>,
    greeting: Arc<str>,
}

/// An axum-hosted [`Transport`] that listens for WebSocket upgrades.
pub struct WebSocketTransport {
    incoming: mpsc::Receiver<WebSocketConnection>,
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
}

impl WebSocketTransport {
    /// Binds the listener and starts serving HTTP in a background task.
    pub async fn bind(
        addr: &str,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        validate_ws_path(&config.ws_path)?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        let local_addr =
            listener.local_addr().map_err(TransportError::BindFailed)?;

        let (incoming_tx, incoming_rx) = mpsc::channel(config.accept_backlog);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let router = build_router(
            &config.ws_path,
            AcceptState {
                incoming: incoming_tx,
                greeting: Arc::from(config.greeting.as_str()),
            },
        );

        tokio::spawn(async move {
            let signal = async move {
                // A dropped sender also ends the wait, so dropping the
                // transport stops the listener.
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
            {
                tracing::error!(error = %e, "HTTP listener failed");
            }
            tracing::info!("HTTP listener stopped");
        });

        tracing::info!(
            %local_addr,
            ws_path = %config.ws_path,
            "WebSocket transport listening"
        );

        Ok(Self {
            incoming: incoming_rx,
            local_addr,
            shutdown: shutdown_tx,
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// The upgrade route must be a literal absolute path other than `/`,
/// which the liveness route already owns.
fn validate_ws_path(path: &str) -> Result<(), TransportError> {
    if !path.starts_with('/') {
        return Err(TransportError::InvalidConfig(format!(
            "ws_path '{path}' must start with '/'"
        )));
    }
    if path == "/" {
        return Err(TransportError::InvalidConfig(
            "ws_path '/' is taken by the liveness route".to_string(),
        ));
    }
    if path.contains(['{', '}', '*', ':']) {
        return Err(TransportError::InvalidConfig(format!(
            "ws_path '{path}' must be a literal path"
        )));
    }
    Ok(())
}

fn build_router(ws_path: &str, state: AcceptState) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route(ws_path, get(upgrade))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn greeting(State(state): State<AcceptState>) -> String {
    state.greeting.to_string()
}

async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AcceptState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let conn = WebSocketConnection::new(socket);
        tracing::debug!(id = %conn.id(), "accepted WebSocket connection");
        if state.incoming.send(conn).await.is_err() {
            tracing::debug!("transport no longer accepting, dropping socket");
        }
    })
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        self.incoming.recv().await.ok_or(TransportError::Shutdown)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        tracing::info!(addr = %self.local_addr, "transport shutting down");
        self.shutdown.send_replace(true);
        Ok(())
    }
}

/// A single upgraded WebSocket.
///
/// The socket is split so that a pending `recv` never blocks a `send`
/// from another task.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream: Mutex<SplitStream<WebSocket>>,
}

impl WebSocketConnection {
    fn new(socket: WebSocket) -> Self {
        let next = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        let id = ConnectionId::new(next);
        let (sink, stream) = socket.split();
        Self {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        let msg = Message::Text(text.to_owned().into());
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        loop {
            let msg = self.stream.lock().await.next().await;
            match msg {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data.to_vec()).map(Some).map_err(
                        |e| TransportError::InvalidFrame(e.to_string()),
                    );
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ws_path_accepts_nested_literal_path() {
        assert!(validate_ws_path("/ws").is_ok());
        assert!(validate_ws_path("/api/live").is_ok());
    }

    #[test]
    fn test_validate_ws_path_rejects_unservable_paths() {
        for path in ["", "/", "ws", "/{id}", "/:id", "/ws/*rest"] {
            assert!(
                matches!(
                    validate_ws_path(path),
                    Err(TransportError::InvalidConfig(_))
                ),
                "{path:?} should be rejected"
            );
        }
    }
}
