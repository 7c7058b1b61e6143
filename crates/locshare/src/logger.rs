//! Logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise every `locshare*` crate and the
/// named binary log at `default_level`.
///
/// ```no_run
/// locshare::logger::setup_logger("locshare_server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    default_directives(binary_name, default_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(binary_name: &str, level: &str) -> String {
    [
        "locshare",
        "locshare_transport",
        "locshare_protocol",
        "locshare_session",
        "locshare_room",
        &binary_name.replace('-', "_"),
        "tower_http",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}
