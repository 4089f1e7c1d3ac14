//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for company, clients, invoices, documents and rates
//! - Database maintenance routes (export, import, backups)
//! - Error to response mapping

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use invoicer_core::document::PdfConverter;
use invoicer_core::rates::RateProvider;
use invoicer_db::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Swappable database handle.
    pub store: Arc<Store>,
    /// HTML to PDF converter.
    pub pdf: Arc<dyn PdfConverter>,
    /// Currency rate source.
    pub rates: Arc<dyn RateProvider>,
    /// Base URL the PDF browser uses to reach this server.
    pub base_url: String,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
