//! HTTP API server for integration with other systems.
//!
//! Exposes the orchestrator operations (select, transcribe, translate, evict)
//! plus read access to cached transcripts.

use crate::cli::Output;
use crate::config::{Settings, TranscriptionBackend, TranslationBackend};
use crate::error::TekstError;
use crate::hashing::{Fingerprint, TranslationTarget};
use crate::orchestrator::Orchestrator;
use crate::transcript::TranslationEntry;
use crate::translation::TranslationItem;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Tekst API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Select", "POST   /select");
    Output::kv("Transcribe", "POST   /transcribe");
    Output::kv("Translate", "POST   /translate");
    Output::kv("List Media", "GET    /media");
    Output::kv("Get Media", "GET    /media/:fingerprint");
    Output::kv("Locate", "GET    /media/:fingerprint/locate?t=ms");
    Output::kv("Evict", "DELETE /media/:fingerprint");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/select", post(select))
        .route("/transcribe", post(transcribe))
        .route("/translate", post(translate))
        .route("/media", get(list_media))
        .route("/media/{fingerprint}", get(get_media).delete(evict))
        .route("/media/{fingerprint}/locate", get(locate))
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SelectRequest {
    path: String,
}

#[derive(Deserialize)]
struct TranscribeRequest {
    path: String,
    #[serde(default)]
    backend: Option<String>,
    /// Transcribe again even if cached
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct TranscribeResponse<T: Serialize> {
    fingerprint: Fingerprint,
    cached: bool,
    record: T,
}

#[derive(Deserialize)]
struct TranslateRequest {
    /// A fingerprint, or "adhoc"
    target: String,
    #[serde(default)]
    items: Option<Vec<TranslationItem>>,
    #[serde(default)]
    backend: Option<String>,
    #[serde(default)]
    only_missing: bool,
}

#[derive(Serialize)]
struct TranslateResponse {
    translations: BTreeMap<usize, TranslationEntry>,
    failed: Vec<usize>,
}

#[derive(Deserialize)]
struct LocateQuery {
    t: u64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Library error carried to an HTTP response.
struct ApiError(TekstError);

impl From<TekstError> for ApiError {
    fn from(e: TekstError) -> Self {
        Self(e)
    }
}

fn status_for(error: &TekstError) -> StatusCode {
    match error {
        TekstError::NotFound(_) => StatusCode::NOT_FOUND,
        TekstError::InvalidInput(_) | TekstError::UnsupportedMedia(_) => StatusCode::BAD_REQUEST,
        TekstError::Config(_) => StatusCode::PRECONDITION_FAILED,
        TekstError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
        TekstError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        TekstError::BackendUnavailable(_)
        | TekstError::MalformedBackendResponse(_)
        | TekstError::Translation(_)
        | TekstError::OpenAI(_)
        | TekstError::Http(_) => StatusCode::BAD_GATEWAY,
        TekstError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn parse_backend<B: std::str::FromStr<Err = String>>(raw: Option<&str>, default: B) -> Result<B, ApiError> {
    match raw {
        Some(s) => s.parse().map_err(|e: String| ApiError(TekstError::InvalidInput(e))),
        None => Ok(default),
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn select(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> ApiResult<crate::orchestrator::SelectResult> {
    Ok(Json(state.orchestrator.select(std::path::Path::new(&req.path)).await?))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscribeRequest>,
) -> ApiResult<TranscribeResponse<crate::transcript::TranscriptRecord>> {
    let default = state.orchestrator.settings().transcription.backend;
    let backend: TranscriptionBackend = parse_backend(req.backend.as_deref(), default)?;

    let (fingerprint, record, cached) = state
        .orchestrator
        .process(std::path::Path::new(&req.path), backend, req.force)
        .await?;

    Ok(Json(TranscribeResponse {
        fingerprint,
        cached,
        record,
    }))
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> ApiResult<TranslateResponse> {
    let target: TranslationTarget = req.target.parse()?;
    let default = state.orchestrator.settings().translation.backend;
    let backend: TranslationBackend = parse_backend(req.backend.as_deref(), default)?;

    let outcome = state
        .orchestrator
        .translate(&target, req.items, backend, req.only_missing, |_, _| {})
        .await?;

    Ok(Json(TranslateResponse {
        translations: outcome.entries,
        failed: outcome.failed,
    }))
}

async fn list_media(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let media = state.orchestrator.list().await?;
    Ok(Json(serde_json::json!({ "total": media.len(), "media": media })))
}

async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(fingerprint): Path<String>,
) -> ApiResult<crate::transcript::TranscriptRecord> {
    let fingerprint: Fingerprint = fingerprint.parse()?;
    Ok(Json(state.orchestrator.require(&fingerprint).await?))
}

async fn locate(
    State(state): State<Arc<AppState>>,
    Path(fingerprint): Path<String>,
    Query(query): Query<LocateQuery>,
) -> ApiResult<crate::orchestrator::PlaybackPosition> {
    let fingerprint: Fingerprint = fingerprint.parse()?;
    Ok(Json(state.orchestrator.locate(&fingerprint, query.t).await?))
}

async fn evict(
    State(state): State<Arc<AppState>>,
    Path(fingerprint): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let fingerprint: Fingerprint = fingerprint.parse()?;
    let existed = state.orchestrator.evict(&fingerprint).await?;
    Ok(Json(serde_json::json!({ "evicted": existed })))
}
