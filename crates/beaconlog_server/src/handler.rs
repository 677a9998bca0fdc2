//! Request handlers, independent of the HTTP framework.

use crate::auth::AccessKey;
use crate::error::{ServerError, ServerResult};
use crate::pixel::Pixel;
use crate::render::{encode_path_segment, render_data_page};
use beaconlog_codec::{decode_for_display, BeaconRequest, ClientObservation};
use beaconlog_core::LogStore;
use beaconlog_storage::StorageBackend;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Handles beacon and retrieval requests against an injected log store.
pub struct BeaconHandler<B: StorageBackend> {
    store: Arc<LogStore<B>>,
    pixel: Pixel,
    access_key: Option<AccessKey>,
}

impl<B: StorageBackend> BeaconHandler<B> {
    /// Creates a handler with retrieval disabled.
    pub fn new(store: Arc<LogStore<B>>, pixel: Pixel) -> Self {
        Self {
            store,
            pixel,
            access_key: None,
        }
    }

    /// Enables retrieval with the given access key.
    pub fn with_access_key(mut self, key: AccessKey) -> Self {
        self.access_key = Some(key);
        self
    }

    /// Returns the log store.
    pub fn store(&self) -> &Arc<LogStore<B>> {
        &self.store
    }

    /// Returns the pixel.
    pub fn pixel(&self) -> &Pixel {
        &self.pixel
    }

    /// Records a beacon fetch and returns the pixel payload.
    ///
    /// Logging failures are reported to the diagnostics log and otherwise
    /// ignored: the caller always gets the image.
    pub fn handle_beacon(&self, request: BeaconRequest) -> Bytes {
        let observation = ClientObservation::capture(&request);
        match self.store.record(&observation) {
            Ok(_) => info!(participant = ?observation.participant_id, "logged beacon"),
            Err(e) => warn!(
                participant = ?observation.participant_id,
                error = %e,
                "failed to log beacon, observation dropped"
            ),
        }
        self.pixel.bytes()
    }

    /// Returns the raw log for download.
    ///
    /// # Errors
    ///
    /// [`ServerError::Unauthorized`] for a bad key, otherwise the log
    /// store's read error.
    pub fn handle_download(&self, key: &str) -> ServerResult<String> {
        self.authorize(key)?;
        Ok(self.store.read_all()?)
    }

    /// Returns the HTML view of the log.
    ///
    /// # Errors
    ///
    /// Same as [`BeaconHandler::handle_download`].
    pub fn handle_view(&self, key: &str) -> ServerResult<String> {
        self.authorize(key)?;
        let text = self.store.read_all()?;
        let rows = decode_for_display(&text);
        let download_href = format!("/download-data/{}", encode_path_segment(key));
        Ok(render_data_page(&rows, &download_href, Utc::now()))
    }

    fn authorize(&self, key: &str) -> ServerResult<()> {
        match &self.access_key {
            Some(access_key) => access_key.verify(key),
            None => Err(ServerError::Unauthorized),
        }
    }
}
