//! Serve command implementation.

use beaconlog_server::{shutdown_signal, BeaconServer, ServerConfig};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

/// Runs the beacon server until SIGINT or SIGTERM.
///
/// Failing to create the log or the pixel aborts startup.
pub fn run(
    bind_addr: SocketAddr,
    data: &Path,
    pixel: &Path,
    access_key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::new(bind_addr)
        .with_data_path(data)
        .with_pixel_path(pixel);
    if let Some(key) = access_key {
        config = config.with_access_key(key);
    }

    info!(?config, "starting beacon server");
    let server = BeaconServer::bootstrap(config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run(shutdown_signal()))?;
    Ok(())
}
