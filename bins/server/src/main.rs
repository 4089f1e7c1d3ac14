//! Invoicer API Server
//!
//! Main entry point for the Invoicer backend service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoicer_api::{AppState, create_router};
use invoicer_core::document::{ChromeOptions, ChromePdfConverter};
use invoicer_core::rates::{CmeOptions, CmeRateProvider};
use invoicer_db::Store;
use invoicer_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoicer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store = Store::open(&config.database.path, config.database.max_connections)
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database.path.display()
            )
        })?;

    let pdf = ChromePdfConverter::new(ChromeOptions {
        executable: config.pdf.chrome_path.clone(),
        timeout: Duration::from_secs(config.pdf.timeout_secs),
        max_concurrent: config.pdf.max_concurrent,
    });
    info!(
        timeout_secs = config.pdf.timeout_secs,
        max_concurrent = config.pdf.max_concurrent,
        "PDF converter configured"
    );

    let rates = CmeRateProvider::new(CmeOptions {
        api_url: config.rates.api_url.clone(),
        page_url: config.rates.page_url.clone(),
        timeout: Duration::from_secs(config.rates.timeout_secs),
    })?;

    let state = AppState {
        store: Arc::new(store),
        pdf: Arc::new(pdf),
        rates: Arc::new(rates),
        base_url: config.server.base_url(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
