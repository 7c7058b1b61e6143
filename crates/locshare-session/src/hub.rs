//! Session hub: a single Tokio task that owns the [`SessionHandler`].
//!
//! Connection tasks never touch room state directly. They send commands
//! through a [`HubHandle`]; the hub applies them one at a time and pushes
//! the resulting events into each target connection's outbound channel.

use std::collections::HashMap;

use locshare_protocol::{ClientEvent, ConnectionId, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::{Outbound, SessionError, SessionHandler};

/// Default command channel size for the hub.
pub const DEFAULT_HUB_CHANNEL_SIZE: usize = 256;

/// Channel the hub uses to deliver events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to the hub through its channel.
enum HubCommand {
    /// Register a connection and its outbound channel.
    Connect {
        conn: ConnectionId,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    /// Apply one client event.
    Event {
        conn: ConnectionId,
        event: ClientEvent,
    },

    /// The connection is gone.
    Disconnect { conn: ConnectionId },

    /// Report current counts.
    Stats { reply: oneshot::Sender<HubStats> },

    /// Stop the hub.
    Shutdown,
}

/// A snapshot of hub occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HubStats {
    /// Connected sessions.
    pub sessions: usize,
    /// Live rooms.
    pub rooms: usize,
}

/// Handle to the running hub. Cheap to clone.
#[derive(Clone, Debug)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Registers a connection. Its greeting is already queued on `sender`
    /// when this returns.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyConnected`] if the id is taken
    /// - [`SessionError::HubClosed`] if the hub has stopped
    pub async fn connect(
        &self,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Connect {
            conn,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| SessionError::HubClosed)?
    }

    /// Forwards a client event (fire-and-forget).
    pub async fn event(
        &self,
        conn: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), SessionError> {
        self.send(HubCommand::Event { conn, event }).await
    }

    /// Reports that a connection has gone away.
    pub async fn disconnect(
        &self,
        conn: ConnectionId,
    ) -> Result<(), SessionError> {
        self.send(HubCommand::Disconnect { conn }).await
    }

    /// Returns current session and room counts.
    pub async fn stats(&self) -> Result<HubStats, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Stats { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::HubClosed)
    }

    /// Tells the hub to stop. Every outbound channel is dropped, which
    /// ends the connection tasks reading from them.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(HubCommand::Shutdown).await
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::HubClosed)
    }
}

/// The hub actor state. Runs inside a Tokio task.
struct Hub {
    handler: SessionHandler,
    senders: HashMap<ConnectionId, EventSender>,
    receiver: mpsc::Receiver<HubCommand>,
}

impl Hub {
    async fn run(mut self) {
        tracing::info!(scope = %self.handler.scope(), "session hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Connect {
                    conn,
                    sender,
                    reply,
                } => {
                    let result = match self.handler.connect(conn) {
                        Ok(out) => {
                            self.senders.insert(conn, sender);
                            self.dispatch(out);
                            Ok(())
                        }
                        Err(e) => {
                            tracing::warn!(
                                %conn,
                                error = %e,
                                "connect rejected"
                            );
                            Err(e)
                        }
                    };
                    let _ = reply.send(result);
                }
                HubCommand::Event { conn, event } => {
                    let out = self.handler.handle(conn, event);
                    self.dispatch(out);
                }
                HubCommand::Disconnect { conn } => {
                    self.senders.remove(&conn);
                    let out = self.handler.disconnect(conn);
                    self.dispatch(out);
                }
                HubCommand::Stats { reply } => {
                    let _ = reply.send(HubStats {
                        sessions: self.handler.session_count(),
                        rooms: self.handler.rooms().len(),
                    });
                }
                HubCommand::Shutdown => {
                    tracing::info!(
                        sessions = self.senders.len(),
                        "session hub shutting down"
                    );
                    break;
                }
            }
        }

        tracing::info!("session hub stopped");
    }

    /// Delivers each event to its target. Targets without a channel are
    /// skipped silently.
    fn dispatch(&self, out: Vec<Outbound>) {
        for Outbound { to, event } in out {
            match self.senders.get(&to) {
                Some(sender) => {
                    let _ = sender.send(event);
                }
                None => {
                    tracing::debug!(
                        conn = %to,
                        "delivery target gone, dropping event"
                    );
                }
            }
        }
    }
}

/// Spawns the hub task and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it is full, connection
/// tasks wait.
pub fn spawn_hub(handler: SessionHandler, channel_size: usize) -> HubHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let hub = Hub {
        handler,
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(hub.run());

    HubHandle { sender: tx }
}
