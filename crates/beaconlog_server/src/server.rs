//! HTTP routing and the server lifecycle.

use crate::auth::AccessKey;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::BeaconHandler;
use crate::pixel::Pixel;
use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::header::{
    ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, EXPIRES, PRAGMA, REFERER,
    USER_AGENT,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use beaconlog_codec::BeaconRequest;
use beaconlog_core::LogStore;
use beaconlog_storage::{FileBackend, StorageBackend};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The beacon server, bootstrapped against a file-backed log.
///
/// # Example
///
/// ```no_run
/// use beaconlog_server::{shutdown_signal, BeaconServer, ServerConfig};
///
/// # async fn start() -> Result<(), beaconlog_server::ServerError> {
/// let config = ServerConfig::default().with_access_key("change-me");
/// let server = BeaconServer::bootstrap(config)?;
/// server.run(shutdown_signal()).await
/// # }
/// ```
pub struct BeaconServer {
    config: ServerConfig,
    handler: Arc<BeaconHandler<FileBackend>>,
}

impl BeaconServer {
    /// Initializes the log and the pixel.
    ///
    /// # Errors
    ///
    /// Fails if the log cannot be created or the pixel can be neither read
    /// nor written. Both are fatal at startup.
    pub fn bootstrap(config: ServerConfig) -> ServerResult<Self> {
        let store = LogStore::open(FileBackend::new(&config.data_path))?;
        let pixel = Pixel::load_or_create(&config.pixel_path)?;

        let mut handler = BeaconHandler::new(Arc::new(store), pixel);
        match &config.access_key {
            Some(key) => handler = handler.with_access_key(AccessKey::new(key)),
            None => warn!("no access key configured, retrieval endpoints are disabled"),
        }

        Ok(Self {
            config,
            handler: Arc::new(handler),
        })
    }

    /// Returns the request handler.
    pub fn handler(&self) -> &Arc<BeaconHandler<FileBackend>> {
        &self.handler
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the listener errors.
    pub async fn run<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            data = %self.config.data_path.display(),
            pixel = %self.config.pixel_path.display(),
            "beacon server listening"
        );

        let app = router(self.handler).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("beacon server stopped");
        Ok(())
    }
}

/// Builds the axum router around a handler.
pub fn router<B: StorageBackend + 'static>(handler: Arc<BeaconHandler<B>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/track/{file}", get(track::<B>))
        .route("/download-data/{key}", get(download_data::<B>))
        .route("/view-data/{key}", get(view_data::<B>))
        .with_state(handler)
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down gracefully"),
        () = terminate => info!("received SIGTERM, shutting down gracefully"),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self.status_code() {
            401 => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            404 => (StatusCode::NOT_FOUND, "No data file found").into_response(),
            _ => {
                error!(error = %self, "cannot serve log");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error reading data file").into_response()
            }
        }
    }
}

async fn index() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Tracking server running.",
    )
}

async fn track<B: StorageBackend + 'static>(
    State(handler): State<Arc<BeaconHandler<B>>>,
    Path(file): Path<String>,
    request: Request,
) -> Response {
    let participant_id = match file.strip_suffix(".png") {
        Some(id) if !id.is_empty() => id,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let beacon = beacon_request(participant_id, &request);

    let fallback = handler.pixel().clone();
    let body = tokio::task::spawn_blocking(move || handler.handle_beacon(beacon))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "beacon logging task failed, observation dropped");
            fallback.bytes()
        });

    (
        [
            (CONTENT_TYPE, "image/png"),
            (CACHE_CONTROL, "no-cache, no-store, must-revalidate, max-age=0"),
            (PRAGMA, "no-cache"),
            (EXPIRES, "0"),
        ],
        body,
    )
        .into_response()
}

async fn download_data<B: StorageBackend + 'static>(
    State(handler): State<Arc<BeaconHandler<B>>>,
    Path(key): Path<String>,
) -> Response {
    match run_blocking(move || handler.handle_download(&key)).await {
        Ok(text) => (
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    CONTENT_DISPOSITION,
                    "attachment; filename=\"tracking-data.csv\"",
                ),
            ],
            text,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn view_data<B: StorageBackend + 'static>(
    State(handler): State<Arc<BeaconHandler<B>>>,
    Path(key): Path<String>,
) -> Response {
    match run_blocking(move || handler.handle_view(&key)).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn run_blocking<T, F>(f: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ServerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Task(e.to_string()))?
}

/// Extracts the observation signals from a beacon fetch.
fn beacon_request(participant_id: &str, request: &Request) -> BeaconRequest {
    let headers = request.headers();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical().to_string());

    BeaconRequest {
        participant_id: participant_id.to_string(),
        remote_addr,
        forwarded_for: joined_header(headers, "x-forwarded-for"),
        user_agent: headers.get(USER_AGENT).map(header_text),
        accept_language: headers.get(ACCEPT_LANGUAGE).map(header_text),
        referer: headers
            .get(REFERER)
            .or_else(|| headers.get("referrer"))
            .map(header_text),
    }
}

fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

/// Joins repeated headers the way proxies chain them.
fn joined_header(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<String> = headers.get_all(name).iter().map(header_text).collect();
    (!values.is_empty()).then(|| values.join(", "))
}
