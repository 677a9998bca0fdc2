//! The tracking pixel.

use crate::error::{ServerError, ServerResult};
use bytes::Bytes;
use std::path::Path;
use tracing::{info, warn};

/// A 1x1 fully transparent PNG.
pub const TRANSPARENT_PNG: [u8; 70] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64, 0x60, 0xF8, 0x5F,
    0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
    0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// The image payload returned by every beacon fetch.
///
/// Loaded once at startup and cloned cheaply per response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixel {
    bytes: Bytes,
}

impl Pixel {
    /// The built-in transparent pixel.
    pub fn transparent() -> Self {
        Self {
            bytes: Bytes::from_static(&TRANSPARENT_PNG),
        }
    }

    /// Wraps an arbitrary image payload.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Reads the pixel from `path`, writing the built-in pixel there first
    /// if it cannot be read.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Pixel`] if the file is unreadable and the
    /// built-in pixel cannot be written in its place.
    pub fn load_or_create(path: &Path) -> ServerResult<Self> {
        match std::fs::read(path) {
            Ok(bytes) => {
                info!(path = %path.display(), bytes = bytes.len(), "pixel image loaded");
                Ok(Self::from_bytes(bytes))
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot read pixel, creating a transparent one"
                );
                std::fs::write(path, TRANSPARENT_PNG).map_err(|source| ServerError::Pixel {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(path = %path.display(), "created pixel image");
                Ok(Self::transparent())
            }
        }
    }

    /// The payload, for a response body.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl Default for Pixel {
    fn default() -> Self {
        Self::transparent()
    }
}
