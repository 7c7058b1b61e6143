//! Server configuration.

use locshare_room::DEFAULT_ID_LEN;
use locshare_session::{DEFAULT_HUB_CHANNEL_SIZE, LocationScope};
use locshare_transport::TransportConfig;

/// Everything needed to start a [`LocshareServer`](crate::LocshareServer).
///
/// Defaults match the stock deployment: all interfaces, port 6969,
/// WebSocket upgrades on `/ws`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind. `0` picks a free port.
    pub port: u16,

    /// Route that accepts WebSocket upgrades.
    pub ws_path: String,

    /// Body of the `GET /` liveness response.
    pub greeting: String,

    /// Length of generated room identifiers.
    pub room_id_len: usize,

    /// Who receives location updates.
    pub location_scope: LocationScope,

    /// Capacity of the session hub's command queue.
    pub hub_channel_size: usize,
}

impl ServerConfig {
    /// `host:port`, suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            ws_path: self.ws_path.clone(),
            greeting: self.greeting.clone(),
            ..TransportConfig::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6969,
            ws_path: "/ws".to_string(),
            greeting: "Welcome to LocShare".to_string(),
            room_id_len: DEFAULT_ID_LEN,
            location_scope: LocationScope::Global,
            hub_channel_size: DEFAULT_HUB_CHANNEL_SIZE,
        }
    }
}
