//! REST API endpoints for the weatherverse-service.
//!
//! This module provides the ingest path (device to store) and the query path
//! (store to dashboard), plus liveness and health endpoints.
//!
//! # Concurrency
//!
//! Every handler that touches the store acquires `state.store` once, performs
//! a single O(1) operation, and releases it before building the response.
//! Requests are ordered only by the order in which they acquire the lock:
//! that is the "arrival order" of the history.
//!
//! ## Error Handling
//!
//! All JSON endpoints return structured errors via [`AppError`]. Malformed
//! input is a `400` and never reaches the store.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use weatherverse_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use weatherverse_store::StoreStats;
use weatherverse_types::{ParseError, Reading};

use crate::ingest::{IngestQuery, IngestRequest, ValidReading};
use crate::state::AppState;

/// Plain-text body returned by the liveness route.
pub const LIVENESS_TEXT: &str = "Server is up!";

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Liveness and health
        .route("/", get(liveness))
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(health_detailed))
        // Ingest and query
        .route("/api/readings", post(ingest_reading))
        .route("/api/readings/latest", get(get_latest))
        .route("/api/readings/history", get(get_history))
        // Routes used by older firmware and the first dashboard
        .route("/update", get(legacy_update))
        .route("/data", get(legacy_data))
        .fallback(not_found)
}

/// Liveness endpoint.
async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Detailed health check response.
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Store counters.
    pub store: StoreStats,
    /// Platform information.
    pub platform: PlatformInfo,
}

/// Platform information.
#[derive(Debug, Serialize)]
pub struct PlatformInfo {
    /// Operating system
    pub os: &'static str,
    /// CPU architecture
    pub arch: &'static str,
}

/// Detailed health check endpoint.
///
/// Acquires the store lock briefly to read its counters.
async fn health_detailed(State(state): State<Arc<AppState>>) -> Json<DetailedHealthResponse> {
    let store = state.store.lock().await.stats();

    Json(DetailedHealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        uptime_seconds: state.uptime_seconds(),
        store,
        platform: PlatformInfo {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        },
    })
}

// ==========================================================================
// Ingest
// ==========================================================================

/// Acknowledgement returned after a reading is recorded.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    /// Timestamp the reading was stored with.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Record a reading sent as a JSON body.
///
/// # Errors
///
/// - Returns [`AppError::BadRequest`] if the body is not JSON, or if a field
///   is missing, non-numeric, non-finite, or the timestamp is malformed
async fn ingest_reading(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::BadRequest(format!("Invalid request body: {}", e.body_text()))
    })?;

    let reading = record(&state, request.validate()?).await;

    Ok(Json(IngestResponse {
        status: "ok",
        timestamp: reading.timestamp(),
    }))
}

/// Record a reading sent as query parameters (`/update?temperature=..&humidity=..`).
///
/// Responds in plain text, as older firmware expects.
async fn legacy_update(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IngestQuery>, QueryRejection>,
) -> (StatusCode, String) {
    let validated = match query {
        Ok(Query(params)) => params.validate(),
        Err(e) => {
            return (StatusCode::BAD_REQUEST, e.body_text());
        }
    };

    match validated {
        Ok(valid) => {
            record(&state, valid).await;
            (StatusCode::OK, "Data updated successfully!".to_string())
        }
        Err(e) if e.is_missing() => {
            warn!("Rejected legacy update: {}", e);
            (StatusCode::BAD_REQUEST, format!("Missing parameters: {}", e))
        }
        Err(e) => {
            warn!("Rejected legacy update: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

async fn record(state: &AppState, valid: ValidReading) -> Reading {
    let reading = {
        let mut store = state.store.lock().await;
        store.record_reading(valid.temperature, valid.humidity, valid.timestamp)
    };

    info!(
        "Data received - temperature: {}, humidity: {}",
        reading.temperature(),
        reading.humidity()
    );
    reading
}

// ==========================================================================
// Query
// ==========================================================================

/// Latest reading, or `null` if nothing has been recorded yet.
async fn get_latest(State(state): State<Arc<AppState>>) -> Json<Option<Reading>> {
    let latest = state.store.lock().await.latest();
    Json(latest)
}

/// Retained history, oldest first. Empty in latest-only mode.
async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<Reading>> {
    let history = state.store.lock().await.history();
    Json(history)
}

/// Latest values in the shape the first dashboard consumed.
#[derive(Debug, Serialize, PartialEq)]
pub struct LegacyData {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

async fn legacy_data(State(state): State<Arc<AppState>>) -> Json<LegacyData> {
    let latest = state.store.lock().await.latest();
    Json(LegacyData {
        temperature: latest.map(|r| r.temperature()),
        humidity: latest.map(|r| r.humidity()),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
}

impl From<ParseError> for AppError {
    fn from(e: ParseError) -> Self {
        warn!("Rejected reading: {}", e);
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use weatherverse_store::Store;

    use crate::config::Config;

    fn create_test_state() -> Arc<AppState> {
        AppState::new(Store::default(), Config::default())
    }

    fn app_with(state: &Arc<AppState>) -> Router {
        router().with_state(Arc::clone(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        send(
            app,
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        )
        .await
    }

    async fn post_json(app: &Router, body: serde_json::Value) -> (StatusCode, String) {
        send(
            app,
            Request::builder()
                .method("POST")
                .uri("/api/readings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_liveness() {
        let app = app_with(&create_test_state());
        let (status, body) = get(&app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Server is up!");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_with(&create_test_state());
        let (status, body) = get(&app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        let json = json(&body);
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_health_detailed_reports_store() {
        let state = create_test_state();
        let app = app_with(&state);
        post_json(&app, serde_json::json!({"temperature": 20, "humidity": 30})).await;

        let (status, body) = get(&app, "/api/health/detailed").await;
        assert_eq!(status, StatusCode::OK);

        let json = json(&body);
        assert_eq!(json["store"]["mode"], "history");
        assert_eq!(json["store"]["len"], 1);
        assert_eq!(json["store"]["capacity"], 24);
        assert_eq!(json["store"]["total_recorded"], 1);
        assert!(json["platform"]["os"].is_string());
    }

    #[tokio::test]
    async fn test_queries_before_ingest_are_empty_not_errors() {
        let app = app_with(&create_test_state());

        let (status, body) = get(&app, "/api/readings/latest").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "null");

        let (status, body) = get(&app, "/api/readings/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_post_then_latest_returns_pair() {
        let app = app_with(&create_test_state());

        let (status, body) =
            post_json(&app, serde_json::json!({"temperature": 26, "humidity": 40})).await;
        assert_eq!(status, StatusCode::OK);
        let ack = json(&body);
        assert_eq!(ack["status"], "ok");
        assert!(ack["timestamp"].is_string());

        let (status, body) = get(&app, "/api/readings/latest").await;
        assert_eq!(status, StatusCode::OK);
        let latest = json(&body);
        assert_eq!(latest["temperature"], 26.0);
        assert_eq!(latest["humidity"], 40.0);
        assert_eq!(latest["timestamp"], ack["timestamp"]);
    }

    #[tokio::test]
    async fn test_post_coerces_string_fields() {
        let app = app_with(&create_test_state());

        let (status, _) =
            post_json(&app, serde_json::json!({"temperature": "31.5", "humidity": "62"})).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = get(&app, "/api/readings/latest").await;
        let latest = json(&body);
        assert_eq!(latest["temperature"], 31.5);
        assert_eq!(latest["humidity"], 62.0);
    }

    #[tokio::test]
    async fn test_post_keeps_device_timestamp() {
        let app = app_with(&create_test_state());

        post_json(
            &app,
            serde_json::json!({
                "temperature": 26,
                "humidity": 40,
                "timestamp": "2025-04-22T09:00:00"
            }),
        )
        .await;

        let (_, body) = get(&app, "/api/readings/latest").await;
        assert_eq!(json(&body)["timestamp"], "2025-04-22T09:00:00Z");
    }

    #[tokio::test]
    async fn test_post_honours_offset_on_short_timestamp() {
        let app = app_with(&create_test_state());

        let (status, _) = post_json(
            &app,
            serde_json::json!({
                "temperature": 26,
                "humidity": 40,
                "timestamp": "2025-04-22T11:00+02:00"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = get(&app, "/api/readings/latest").await;
        let stored = json(&body)["timestamp"].as_str().unwrap().to_string();
        let stored = OffsetDateTime::parse(
            &stored,
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap();
        assert_eq!(stored, time::macros::datetime!(2025-04-22 09:00:00 UTC));
    }

    #[tokio::test]
    async fn test_post_missing_field_leaves_store_unchanged() {
        let state = create_test_state();
        let app = app_with(&state);

        post_json(&app, serde_json::json!({"temperature": 20, "humidity": 30})).await;
        let (_, before) = get(&app, "/api/readings/history").await;

        let (status, body) = post_json(&app, serde_json::json!({"temperature": 26})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].as_str().unwrap().contains("humidity"));

        let (_, after) = get(&app, "/api/readings/history").await;
        assert_eq!(before, after);
        assert_eq!(state.store.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_post_invalid_values_rejected() {
        let state = create_test_state();
        let app = app_with(&state);

        for body in [
            serde_json::json!({"temperature": "warm", "humidity": 40}),
            serde_json::json!({"temperature": 26, "humidity": false}),
            serde_json::json!({"temperature": "NaN", "humidity": 40}),
            serde_json::json!({"temperature": 26, "humidity": 40, "timestamp": "noon"}),
        ] {
            let (status, body) = post_json(&app, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(json(&body)["error"].is_string());
        }

        assert!(state.store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_post_malformed_body() {
        let app = app_with(&create_test_state());

        let (status, body) = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/readings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            json(&body)["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request body")
        );

        let (status, _) = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/readings")
                .body(Body::from(r#"{"temperature":1,"humidity":2}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_keeps_last_24() {
        let app = app_with(&create_test_state());

        for i in 1..=25 {
            let (status, _) =
                post_json(&app, serde_json::json!({"temperature": i, "humidity": 40})).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = get(&app, "/api/readings/history").await;
        assert_eq!(status, StatusCode::OK);

        let history = json(&body);
        let history = history.as_array().unwrap();
        assert_eq!(history.len(), 24);
        assert_eq!(history[0]["temperature"], 2.0);
        assert_eq!(history[23]["temperature"], 25.0);

        let (_, latest) = get(&app, "/api/readings/latest").await;
        assert_eq!(json(&latest)["temperature"], 25.0);
    }

    #[tokio::test]
    async fn test_latest_only_mode() {
        let state = AppState::new(Store::latest_only(), Config::default());
        let app = app_with(&state);

        post_json(&app, serde_json::json!({"temperature": 20, "humidity": 30})).await;
        post_json(&app, serde_json::json!({"temperature": 21, "humidity": 31})).await;

        let (_, latest) = get(&app, "/api/readings/latest").await;
        assert_eq!(json(&latest)["temperature"], 21.0);

        let (status, history) = get(&app, "/api/readings/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history, "[]");
    }

    #[tokio::test]
    async fn test_queries_are_idempotent() {
        let app = app_with(&create_test_state());
        post_json(&app, serde_json::json!({"temperature": 26, "humidity": 40})).await;

        let first = get(&app, "/api/readings/latest").await;
        let second = get(&app, "/api/readings/latest").await;
        assert_eq!(first, second);

        let first = get(&app, "/api/readings/history").await;
        let second = get(&app, "/api/readings/history").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_legacy_update_and_data() {
        let app = app_with(&create_test_state());

        let (status, body) = get(&app, "/data").await;
        assert_eq!(status, StatusCode::OK);
        let data = json(&body);
        assert!(data["temperature"].is_null());
        assert!(data["humidity"].is_null());

        let (status, body) = get(&app, "/update?temperature=26&humidity=40").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Data updated successfully!");

        let (_, body) = get(&app, "/data").await;
        let data = json(&body);
        assert_eq!(data["temperature"], 26.0);
        assert_eq!(data["humidity"], 40.0);

        let (_, body) = get(&app, "/api/readings/latest").await;
        assert_eq!(json(&body)["temperature"], 26.0);
    }

    #[tokio::test]
    async fn test_legacy_update_rejects_missing_and_invalid() {
        let state = create_test_state();
        let app = app_with(&state);

        let (status, body) = get(&app, "/update?temperature=26").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Missing parameters"));

        let (status, body) = get(&app, "/update?temperature=26&humidity=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Missing parameters"));

        let (status, body) = get(&app, "/update?temperature=hot&humidity=40").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("temperature must be numeric"));

        assert!(state.store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = app_with(&create_test_state());
        let (status, body) = get(&app, "/api/devices").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json(&body)["error"].is_string());
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "0.1.0",
            timestamp: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_app_error_bad_request() {
        let response = AppError::BadRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_app_error_from_parse_error() {
        let error: AppError = ParseError::MissingField("humidity").into();
        assert!(matches!(error, AppError::BadRequest(ref msg) if msg.contains("humidity")));
    }
}
