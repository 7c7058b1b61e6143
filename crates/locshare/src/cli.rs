//! Command-line and environment configuration for `locshare-server`.
//!
//! Every flag falls back to an environment variable, and [`load_dotenv`]
//! fills the environment from a `.env` file first, so a deployment can
//! configure the server with flags, real variables, or a `.env` file.

use std::path::PathBuf;

use clap::Parser;
use locshare_session::LocationScope;

use crate::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "locshare-server")]
#[command(about = "Room-based live location sharing relay", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 6969)]
    pub port: u16,

    /// Route that accepts WebSocket upgrades
    #[arg(long, env = "LOCSHARE_WS_PATH", default_value = "/ws")]
    pub ws_path: String,

    /// Body returned by the liveness route
    #[arg(
        long,
        env = "LOCSHARE_GREETING",
        default_value = "Welcome to LocShare"
    )]
    pub greeting: String,

    /// Length of generated room identifiers
    #[arg(long, env = "LOCSHARE_ROOM_ID_LEN", default_value_t = 5)]
    pub room_id_len: usize,

    /// Who receives location updates: `global` or `room`
    #[arg(
        long,
        env = "LOCSHARE_LOCATION_SCOPE",
        default_value_t = LocationScope::Global
    )]
    pub location_scope: LocationScope,

    /// Capacity of the session hub command queue
    #[arg(long, env = "LOCSHARE_HUB_CHANNEL_SIZE", default_value_t = 256)]
    pub hub_channel_size: usize,

    /// Default log level when `RUST_LOG` is unset
    #[arg(long, env = "LOCSHARE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            ws_path: args.ws_path,
            greeting: args.greeting,
            room_id_len: args.room_id_len,
            location_scope: args.location_scope,
            hub_channel_size: args.hub_channel_size,
        }
    }
}

/// Loads `.env` from the working directory or one of its parents.
///
/// Variables already present in the process environment are kept.
/// Returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
