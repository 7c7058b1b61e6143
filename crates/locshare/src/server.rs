//! `LocshareServer` builder and server loop.
//!
//! This is the entry point for running a LocShare relay. It ties
//! together all the layers: transport → protocol → session → room.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use locshare_protocol::{Codec, JsonCodec};
use locshare_room::{IdGenerator, RandomIdGenerator, RoomRegistry};
use locshare_session::{HubHandle, SessionHandler, spawn_hub};
use locshare_transport::{
    Transport, TransportError, WebSocketConnection, WebSocketTransport,
};

use crate::handler::handle_connection;
use crate::{LocshareError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) hub: HubHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a LocShare server.
///
/// # Example
///
/// ```rust,no_run
/// use locshare::prelude::*;
///
/// # async fn start() -> Result<(), LocshareError> {
/// let server = LocshareServer::builder()
///     .config(ServerConfig { port: 8080, ..ServerConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LocshareServerBuilder {
    config: ServerConfig,
    rooms: Option<RoomRegistry>,
}

impl LocshareServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            rooms: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Draws room identifiers from `ids` instead of the random default.
    /// Overrides `room_id_len`.
    pub fn id_generator(mut self, ids: impl IdGenerator) -> Self {
        self.rooms = Some(RoomRegistry::with_generator(ids));
        self
    }

    /// Binds the listener and starts the session hub.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(
        self,
    ) -> Result<LocshareServer<JsonCodec>, LocshareError> {
        let config = self.config;
        let transport = WebSocketTransport::bind(
            &config.bind_addr(),
            config.transport_config(),
        )
        .await?;

        let rooms = self.rooms.unwrap_or_else(|| {
            let ids = RandomIdGenerator::new(config.room_id_len);
            RoomRegistry::with_generator(ids)
        });
        let hub = spawn_hub(
            SessionHandler::new(rooms, config.location_scope),
            config.hub_channel_size,
        );

        Ok(LocshareServer {
            transport,
            state: Arc::new(ServerState {
                hub,
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for LocshareServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound LocShare server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct LocshareServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl LocshareServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> LocshareServerBuilder {
        LocshareServerBuilder::new()
    }
}

impl<C: Codec> LocshareServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Handle to the session hub, for diagnostics.
    pub fn hub(&self) -> HubHandle {
        self.state.hub.clone()
    }

    /// Runs the accept loop until the transport shuts down.
    pub async fn run(self) -> Result<(), LocshareError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` resolves, then stops the
    /// listener and the session hub. Every open connection is closed.
    pub async fn run_until(
        mut self,
        signal: impl Future<Output = ()>,
    ) -> Result<(), LocshareError> {
        tracing::info!(addr = %self.local_addr(), "LocShare server running");
        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = &mut signal => {
                    tracing::info!("shutdown requested");
                    self.transport.shutdown().await?;
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => self.spawn_connection(conn),
                    Err(TransportError::Shutdown) => break,
                    Err(e) => tracing::error!(error = %e, "accept failed"),
                },
            }
        }

        if let Err(e) = self.state.hub.shutdown().await {
            tracing::debug!(error = %e, "hub already stopped");
        }
        tracing::info!("LocShare server stopped");
        Ok(())
    }

    fn spawn_connection(&self, conn: WebSocketConnection) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(conn, state).await {
                tracing::debug!(error = %e, "connection ended with error");
            }
        });
    }
}
