//! LocShare relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin locshare-server
//! PORT=8080 cargo run --bin locshare-server -- --location-scope room
//! ```
//!
//! Settings may also come from a `.env` file in the working directory.

use clap::Parser;
use locshare::cli::{ServerArgs, load_dotenv};
use locshare::logger::setup_logger;
use locshare::prelude::*;

#[tokio::main]
async fn main() {
    let dotenv_path = load_dotenv();
    let args = ServerArgs::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);
    if let Some(path) = dotenv_path {
        tracing::info!(path = %path.display(), "loaded environment file");
    }

    let server =
        match LocshareServer::builder().config(args.into()).build().await {
            Ok(server) => server,
            Err(e) => {
                tracing::error!(error = %e, "failed to start server");
                std::process::exit(1);
            }
        };

    if let Err(e) = server.run_until(shutdown_signal()).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
