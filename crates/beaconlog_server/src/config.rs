//! Server configuration.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the beacon server.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Path of the observation log.
    pub data_path: PathBuf,
    /// Path of the pixel image.
    pub pixel_path: PathBuf,
    /// Shared key for the retrieval endpoints. Retrieval is refused when unset.
    pub access_key: Option<String>,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            data_path: PathBuf::from("requests.csv"),
            pixel_path: PathBuf::from("pixel.png"),
            access_key: None,
        }
    }

    /// Sets the log path.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Sets the pixel path.
    pub fn with_pixel_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pixel_path = path.into();
        self
    }

    /// Sets the access key. An empty key leaves retrieval disabled.
    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.access_key = (!key.is_empty()).then_some(key);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 3000)))
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("data_path", &self.data_path)
            .field("pixel_path", &self.pixel_path)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
