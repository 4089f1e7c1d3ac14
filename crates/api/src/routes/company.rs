//! Company profile routes.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};
use invoicer_core::invoice::CompanyProfile;
use invoicer_db::CompanyRepository;

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/company", get(get_company).post(save_company))
}

/// GET `/company` - Current profile, empty before the first save.
async fn get_company(State(state): State<AppState>) -> Result<Json<CompanyProfile>, ApiError> {
    let db = state.store.read().await;
    let profile = CompanyRepository::new(db.clone()).load().await?;
    Ok(Json(profile))
}

/// POST `/company` - Replace the profile.
async fn save_company(
    State(state): State<AppState>,
    Json(profile): Json<CompanyProfile>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    CompanyRepository::new(db.clone()).save(&profile).await?;
    tracing::info!("Company profile saved");
    Ok(Json(json!({ "success": true })))
}
