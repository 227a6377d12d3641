use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Extension, Multipart, Path},
    http::{HeaderMap, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::errors::ApiError;
use crate::intake::{self, SavedEntry};
use crate::storage::{BlobStore, MAX_UPLOAD_BYTES, Record, RecordStore};

/// Shared handles to the two stores, injected into every handler.
pub struct AppState {
    pub blobs: Arc<dyn BlobStore>,
    pub records: Arc<dyn RecordStore>,
}

pub fn app(state: Arc<AppState>, upload_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/save", post(save_entry))
        .route("/all", get(all_entries))
        .route("/entry/{id}", get(entry_by_id))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        // headroom over the file limit so the pipeline's own size check
        // produces the 400, not the body-limit layer
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

async fn save_entry(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SavedEntry>, ApiError> {
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    Ok(Json(intake::save_entry(&state, host, multipart).await?))
}

async fn all_entries(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(state.records.list().await?))
}

async fn entry_by_id(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Record>, ApiError> {
    Ok(Json(state.records.get(&id).await?))
}
