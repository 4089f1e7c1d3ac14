//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod clients;
pub mod company;
pub mod database;
pub mod documents;
pub mod health;
pub mod invoices;
pub mod rates;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(company::routes())
        .merge(clients::routes())
        .merge(invoices::routes())
        .merge(documents::routes())
        .merge(rates::routes())
        .merge(database::routes())
}
