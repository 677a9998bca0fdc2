//! # Beaconlog Server
//!
//! HTTP surface for beaconlog.
//!
//! This crate provides:
//! - The beacon endpoint, which logs an observation and returns a 1x1 PNG
//! - Raw and HTML retrieval endpoints behind a shared access key
//! - The pixel asset, loaded from disk or created on first start
//!
//! # Architecture
//!
//! [`BeaconHandler`] holds the injected [`beaconlog_core::LogStore`], the
//! pixel and the access key, and knows nothing about HTTP. [`router`] wraps
//! it in axum routes and moves blocking store I/O onto the blocking pool.
//!
//! # Routes
//!
//! | Route | Response |
//! |---|---|
//! | `GET /` | liveness text |
//! | `GET /track/{id}.png` | the pixel, always, even if logging fails |
//! | `GET /download-data/{key}` | the raw log as `text/csv` |
//! | `GET /view-data/{key}` | an HTML table of the log |

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod pixel;
mod render;
mod server;

pub use auth::AccessKey;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::BeaconHandler;
pub use pixel::{Pixel, TRANSPARENT_PNG};
pub use render::render_data_page;
pub use server::{router, shutdown_signal, BeaconServer};
