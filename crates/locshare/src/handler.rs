//! Per-connection handler: frame decoding and delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the hub (which queues the `connected` greeting)
//!   2. Loop: decode inbound frames → hub, and hub deliveries → socket
//!   3. On exit for any reason, the guard tells the hub we are gone

use std::sync::Arc;

use locshare_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use locshare_session::HubHandle;
use locshare_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::LocshareError;
use crate::server::ServerState;

/// Drop guard that reports the disconnect when the handler exits.
///
/// Runs on clean close, transport error, and panic alike, so the hub
/// sees exactly one disconnect per registered connection. `Drop` is
/// synchronous, so the notification goes out on a spawned task.
struct DisconnectGuard {
    conn_id: ConnectionId,
    hub: HubHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let hub = self.hub.clone();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%conn_id, "no runtime to report disconnect on");
            return;
        };
        runtime.spawn(async move {
            if let Err(e) = hub.disconnect(conn_id).await {
                tracing::debug!(
                    %conn_id,
                    error = %e,
                    "disconnect not delivered"
                );
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), LocshareError> {
    let conn_id = conn.id();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.hub.connect(conn_id, tx).await?;
    let _guard = DisconnectGuard {
        conn_id,
        hub: state.hub.clone(),
    };
    tracing::info!(%conn_id, "client connected");

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(frame)) => {
                    handle_frame(&conn, &state, &frame).await?;
                }
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed cleanly");
                    break;
                }
                Err(TransportError::InvalidFrame(reason)) => {
                    tracing::debug!(%conn_id, %reason, "invalid frame");
                    let reply = ServerEvent::error(400, reason);
                    send_event(&conn, &state.codec, &reply).await?;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            },

            outbound = rx.recv() => match outbound {
                Some(event) => send_event(&conn, &state.codec, &event).await?,
                None => {
                    tracing::info!(%conn_id, "hub stopped, closing connection");
                    let _ = conn.close().await;
                    break;
                }
            },
        }
    }

    // _guard drops here → hub disconnect fires.
    Ok(())
}

/// Decodes one frame and forwards it. Undecodable frames are answered
/// with `error {400}`; the connection stays open.
async fn handle_frame<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    frame: &str,
) -> Result<(), LocshareError> {
    let conn_id = conn.id();
    match state.codec.decode::<ClientEvent>(frame) {
        Ok(event) => {
            state.hub.event(conn_id, event).await?;
        }
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "failed to decode event");
            send_event(
                conn,
                &state.codec,
                &ServerEvent::error(400, format!("invalid message: {e}")),
            )
            .await?;
        }
    }
    Ok(())
}

async fn send_event(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: &ServerEvent,
) -> Result<(), LocshareError> {
    let frame = codec.encode(event)?;
    conn.send(&frame).await?;
    Ok(())
}
