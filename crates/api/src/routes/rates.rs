//! Currency rate routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::{AppState, error::ApiError};
use invoicer_core::rates::CurrencyRates;

/// Creates the rate routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/rates/cme", get(cme_rates))
}

/// GET `/rates/cme` - Today's selling rates; 502 when the source fails.
async fn cme_rates(State(state): State<AppState>) -> Result<Json<CurrencyRates>, ApiError> {
    let rates = state.rates.current_rates().await?;
    Ok(Json(rates))
}
