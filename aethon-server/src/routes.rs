//! Router construction and request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use aethon_prompt::{AbTestManager, AbTestStatus, DEFAULT_TEST, GenerationParams, PromptStore};
use aethon_rag::{Document, IndexReport, NamedEntity, RagEngine, RagError, RetrievalResult};

use crate::error::ApiError;

/// Largest accepted document upload, in bytes.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default number of entities returned when the caller does not ask for
/// a specific count.
const DEFAULT_ENTITY_TOP_K: usize = 5;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RagEngine>,
    pub ab_tests: Arc<RwLock<AbTestManager>>,
    pub prompts: Arc<PromptStore>,
}

impl AppState {
    pub fn new(engine: RagEngine, ab_tests: AbTestManager, prompts: PromptStore) -> Self {
        Self {
            engine: Arc::new(engine),
            ab_tests: Arc::new(RwLock::new(ab_tests)),
            prompts: Arc::new(prompts),
        }
    }
}

/// Build the API router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/documents",
            post(upload_document).get(active_document).delete(clear_document),
        )
        .route("/api/documents/entities", get(document_entities))
        .route("/api/query", post(query_document))
        .route("/api/entities", post(extract_entities))
        .route("/api/snapshot", post(save_snapshot))
        .route("/api/snapshot/restore", post(restore_snapshot))
        .route("/api/ab-test/status", get(ab_status_all))
        .route("/api/ab-test/status/{name}", get(ab_status))
        .route("/api/ab-test/toggle/{name}", post(ab_toggle))
        .route("/api/prompt-variant", get(prompt_variant))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "aethon-server",
        "engine": state.engine.status().await,
    }))
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    filename: String,
    #[serde(default)]
    extract_entities: bool,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    #[serde(flatten)]
    report: IndexReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    entities: Option<Vec<NamedEntity>>,
}

async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let report = state.engine.load(&params.filename, &body).await?;
    let entities = if params.extract_entities {
        Some(state.engine.entities(DEFAULT_ENTITY_TOP_K).await?)
    } else {
        None
    };
    Ok(Json(UploadResponse { report, entities }))
}

#[derive(Debug, Serialize)]
struct ActiveDocumentResponse {
    status: aethon_rag::EngineStatus,
    document: Option<Document>,
}

async fn active_document(State(state): State<AppState>) -> Json<ActiveDocumentResponse> {
    Json(ActiveDocumentResponse {
        status: state.engine.status().await,
        document: state.engine.document().await,
    })
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<String>,
}

async fn clear_document(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.engine.clear().await;
    Json(ClearResponse {
        cleared: cleared.is_some(),
        document_id: cleared.map(|document| document.id),
    })
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
struct QueryApiResponse {
    context: String,
    excerpts: Vec<RetrievalResult>,
}

async fn query_document(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryApiResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(RagError::Config("query must not be empty".to_string()).into());
    }
    let response = state.engine.query(&request.query, request.top_k).await?;
    Ok(Json(QueryApiResponse { context: response.context, excerpts: response.excerpts }))
}

#[derive(Debug, Deserialize)]
struct EntityParams {
    #[serde(default = "default_entity_top_k")]
    top_k: usize,
}

fn default_entity_top_k() -> usize {
    DEFAULT_ENTITY_TOP_K
}

#[derive(Debug, Serialize)]
struct EntityResponse {
    entities: Vec<NamedEntity>,
}

async fn document_entities(
    State(state): State<AppState>,
    Query(params): Query<EntityParams>,
) -> Result<Json<EntityResponse>, ApiError> {
    let entities = state.engine.entities(params.top_k).await?;
    Ok(Json(EntityResponse { entities }))
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    text: String,
    #[serde(default = "default_entity_top_k")]
    top_k: usize,
}

async fn extract_entities(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<EntityResponse> {
    Json(EntityResponse { entities: state.engine.extract_entities(&request.text, request.top_k) })
}

#[derive(Debug, Deserialize)]
struct SnapshotRequest {
    path: PathBuf,
}

async fn save_snapshot(
    State(state): State<AppState>,
    Json(request): Json<SnapshotRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.engine.persist(&request.path).await?;
    Ok(Json(json!({ "saved": true, "path": request.path })))
}

async fn restore_snapshot(
    State(state): State<AppState>,
    Json(request): Json<SnapshotRequest>,
) -> Result<Json<IndexReport>, ApiError> {
    let report = state.engine.restore(&request.path).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct AbStatusAllResponse {
    tests: Vec<AbTestStatus>,
}

async fn ab_status_all(State(state): State<AppState>) -> Json<AbStatusAllResponse> {
    Json(AbStatusAllResponse { tests: state.ab_tests.read().await.status_all() })
}

async fn ab_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AbTestStatus>, ApiError> {
    Ok(Json(state.ab_tests.read().await.status(&name)?))
}

#[derive(Debug, Deserialize)]
struct ToggleParams {
    enabled: bool,
}

async fn ab_toggle(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ToggleParams>,
) -> Result<Json<AbTestStatus>, ApiError> {
    let mut manager = state.ab_tests.write().await;
    manager.toggle(&name, params.enabled)?;
    info!(test = %name, enabled = params.enabled, "A/B test toggled via API");
    Ok(Json(manager.status(&name)?))
}

#[derive(Debug, Deserialize)]
struct VariantParams {
    #[serde(default = "default_test_name")]
    test: String,
}

fn default_test_name() -> String {
    DEFAULT_TEST.to_string()
}

#[derive(Debug, Serialize)]
struct VariantResponse {
    test: String,
    variant: String,
    system_prompt: String,
    params: GenerationParams,
}

async fn prompt_variant(
    State(state): State<AppState>,
    Query(params): Query<VariantParams>,
) -> Json<VariantResponse> {
    let label = state.ab_tests.read().await.select_variant(&params.test);
    let variant = state.prompts.get(&label);
    Json(VariantResponse {
        test: params.test,
        variant: label,
        system_prompt: variant.system_prompt.clone(),
        params: variant.params.clone(),
    })
}
