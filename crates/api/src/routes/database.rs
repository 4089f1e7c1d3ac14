//! Database maintenance routes: status, export, import and backups.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};
use invoicer_db::StoreStatus;

/// Largest accepted database upload.
const MAX_IMPORT_BYTES: usize = 256 * 1024 * 1024;

/// Creates the database maintenance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/database/status", get(status))
        .route("/database/export", get(export))
        .route(
            "/database/import",
            post(import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        .route("/database/restart", post(restart))
        .route("/database/backups", get(list_backups))
        .route("/database/backups/use", post(use_backup))
        .route("/database/backups/delete-all", post(delete_backups))
}

/// Request body for restoring a backup.
#[derive(Debug, Deserialize)]
pub struct UseBackupRequest {
    /// Backup file name as listed by `/database/backups`.
    pub filename: String,
}

/// GET `/database/status`
async fn status(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.store.status().await)
}

/// GET `/database/export` - The raw SQLite file.
async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.store.export().await?;
    let filename = format!("invoices-backup-{}.db", Local::now().format("%Y-%m-%d"));
    tracing::info!(size = bytes.len(), filename = %filename, "Database exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// POST `/database/import` - Replace the database with the request body.
async fn import(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation("No file uploaded"));
    }
    let backup = state.store.import(&body).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Database imported successfully",
        "backup": backup,
    })))
}

/// POST `/database/restart` - Reopen the connection pool.
async fn restart(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.restart().await?;
    Ok(Json(json!({ "success": true })))
}

/// GET `/database/backups` - Backup names, newest first.
async fn list_backups(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let backups = state.store.list_backups().await?;
    Ok(Json(json!({ "backups": backups })))
}

/// POST `/database/backups/use` - Restore a backup over the current database.
async fn use_backup(
    State(state): State<AppState>,
    Json(payload): Json<UseBackupRequest>,
) -> Result<Json<Value>, ApiError> {
    let backup = state.store.restore_backup(&payload.filename).await?;
    Ok(Json(json!({
        "success": true,
        "restored": payload.filename,
        "backup": backup,
    })))
}

/// POST `/database/backups/delete-all`
async fn delete_backups(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let deleted = state.store.delete_backups().await?;
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
