//! Gallery HTTP API server.
//!
//! Exposes the query engine over JSON HTTP for the gallery frontend. No
//! query logic lives here: handlers parse the wire shape, call the engine,
//! and wrap the outcome in the response envelope.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/nfts` | Filter/search/order/paginate the collection |
//! | `GET`  | `/api/nfts/{token_id}?contractAddress=` | Single item by token id |
//! | `GET`  | `/api/collection/attributes?contractAddress=` | Category → observed values |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Response envelope
//!
//! Every endpoint answers with:
//!
//! ```json
//! { "success": true, "data": ... }
//! { "success": false, "data": { "error": "...", "info": { ... } } }
//! ```
//!
//! Validation failures are `400` with field-level `info`; an unknown token
//! id is `404`; an unavailable snapshot is `503`; anything unexpected is a
//! generic `500` with no internals leaked.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted — the gallery frontend
//! is served from a different origin than the API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::GalleryError;
use crate::query::{QueryEngine, QueryRequest};
use crate::schema::AttributeSchema;
use crate::snapshot::SnapshotStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    engine: Arc<QueryEngine>,
}

/// Starts the gallery HTTP server.
///
/// Builds the engine from configuration (schema, snapshot store, query
/// limits), binds to `[server].bind`, and serves until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let engine = Arc::new(QueryEngine::new(
        AttributeSchema::ens_maxis(),
        SnapshotStore::new(&config.collections),
        config.query.clone(),
    ));
    run_server_with_engine(&config.server.bind, engine).await
}

/// Like [`run_server`], but accepts a prebuilt engine. Used by tests and by
/// embedders that construct their own schema.
pub async fn run_server_with_engine(
    bind_addr: &str,
    engine: Arc<QueryEngine>,
) -> anyhow::Result<()> {
    let state = AppState { engine };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/nfts", post(handle_post_nfts))
        .route("/api/nfts/{token_id}", get(handle_get_nft))
        .route("/api/collection/attributes", get(handle_get_attributes))
        .route("/health", get(handle_health))
        .layer(axum::middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state);

    println!("Gallery API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Request log line, one per call.
async fn log_request(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    println!("{} {} -> {}", method, uri, response.status());
    response
}

// ============ Response envelope ============

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Serialize)]
struct SuccessBody<T: Serialize> {
    success: bool,
    data: T,
}

fn success<T: Serialize>(data: T) -> Json<SuccessBody<T>> {
    Json(SuccessBody {
        success: true,
        data,
    })
}

/// Failure envelope: `{ "success": false, "data": { "error", "info"? } }`.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    data: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<serde_json::Value>,
}

/// Internal error type that converts into an HTTP response.
struct ApiError {
    status: StatusCode,
    error: String,
    info: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            data: ErrorDetail {
                error: self.error,
                info: self.info,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Maps engine errors to transport status codes. The one place status-code
/// policy lives.
fn classify_error(operation: &str, err: GalleryError) -> ApiError {
    let status = match &err {
        GalleryError::TokenNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_validation() => StatusCode::BAD_REQUEST,
        _ => {
            eprintln!("{} failed: {}", operation, err);
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    ApiError {
        status,
        error: err.to_string(),
        info: err.info(),
    }
}

fn bad_request(error: impl Into<String>, info: Option<serde_json::Value>) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        error: error.into(),
        info,
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/nfts ============

/// Handler for `POST /api/nfts`.
///
/// The body is deserialized in two steps so a malformed request produces
/// the envelope (with the serde failure as `info`) instead of a transport
/// level rejection.
async fn handle_post_nfts(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let request: QueryRequest = serde_json::from_value(body).map_err(|e| {
        bad_request(
            "Failed to validate request body",
            Some(serde_json::json!({ "detail": e.to_string() })),
        )
    })?;

    let result = state
        .engine
        .query(&request)
        .map_err(|e| classify_error("query nfts", e))?;
    Ok(success(result))
}

// ============ GET /api/nfts/{token_id} ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractQuery {
    contract_address: String,
}

#[derive(Serialize)]
struct SingleNftResponse {
    nft: crate::models::Nft,
}

async fn handle_get_nft(
    State(state): State<AppState>,
    Path(token_id): Path<u64>,
    Query(query): Query<ContractQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let nft = state
        .engine
        .get_by_token_id(&query.contract_address, token_id)
        .map_err(|e| classify_error("get nft", e))?;
    Ok(success(SingleNftResponse { nft }))
}

// ============ GET /api/collection/attributes ============

#[derive(Serialize)]
struct AttributesResponse {
    attributes: std::collections::BTreeMap<String, Vec<String>>,
}

async fn handle_get_attributes(
    State(state): State<AppState>,
    Query(query): Query<ContractQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let attributes = state
        .engine
        .attribute_summary(&query.contract_address)
        .map_err(|e| classify_error("collection attributes", e))?;
    Ok(success(AttributesResponse { attributes }))
}
