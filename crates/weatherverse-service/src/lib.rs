//! HTTP ingest and query API for the WeatherVerse station.
//!
//! This crate provides a small service that:
//! - Accepts temperature/humidity readings from a sensor device
//! - Keeps them in an in-memory store (latest-only or bounded history)
//! - Serves the latest reading and the history to dashboards as JSON
//!
//! # REST API Endpoints
//!
//! - `GET /` - Liveness text
//! - `GET /api/health` - Service health check
//! - `GET /api/health/detailed` - Health plus store counters
//! - `POST /api/readings` - Record a reading (`{"temperature": .., "humidity": ..}`)
//! - `GET /api/readings/latest` - Latest reading, or `null`
//! - `GET /api/readings/history` - Retained readings, oldest first
//! - `GET /update?temperature=..&humidity=..` - Query-string ingest for older firmware
//! - `GET /data` - Latest values as `{"temperature": .., "humidity": ..}`
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/weatherverse/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [store]
//! mode = "history"       # or "latest"
//! history_capacity = 24
//! ```

pub mod api;
pub mod config;
pub mod ingest;
pub mod state;

pub use config::{Config, ConfigError, ServerConfig, StoreConfig, ValidationError};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete application: API routes, request tracing and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
