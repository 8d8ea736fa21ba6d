//! xformd: a single-client TCP server for fixed-frame binary transforms
//!
//! The server binds one listening socket, selects a transform operation
//! from the first CLI argument, then serves one connection at a time:
//! read a fixed-length request frame, apply the transform, write the
//! response, close the connection.
//!
//! Operations:
//! - `inc`: increment a little-endian u64 counter (8-byte frames)
//! - `mul`: scalar multiplication modulo 2^255 - 19 (32-byte frames)
//!
//! Configuration via CLI arguments or TOML file; a termination signal
//! triggers a best-effort notice before the process exits.

mod config;
mod ops;
mod server;
mod shutdown;

use config::Config;
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        listen = %config.listen,
        operation = ?config.operation,
        "Starting xformd server"
    );

    // Best-effort notice when the process is told to stop
    shutdown::install()?;

    Server::new(config).run()
}
