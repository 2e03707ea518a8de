//! Logging setup for the CLI
//!
//! `RUST_LOG` wins when set; otherwise the `-v` count picks the level for
//! this crate. Output goes to stderr so `rabbit scan` keeps stdout clean.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "rabbit=warn",
        1 => "rabbit=info",
        2 => "rabbit=debug",
        _ => "rabbit=trace",
    }
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbosity >= 2)
            .compact(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
