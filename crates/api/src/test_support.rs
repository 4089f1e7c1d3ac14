//! Fakes and request helpers for route tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use invoicer_core::document::{PdfConverter, PdfError};
use invoicer_core::rates::{CurrencyRates, RateError, RateProvider};
use invoicer_db::Store;

use crate::{AppState, create_router};

pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake";

/// Records requested URLs and returns fixed bytes.
#[derive(Default)]
pub struct FakePdf {
    pub urls: Mutex<Vec<String>>,
}

#[async_trait]
impl PdfConverter for FakePdf {
    async fn convert(&self, url: &str) -> Result<Vec<u8>, PdfError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(FAKE_PDF.to_vec())
    }
}

/// Returns canned rates, or fails when `rates` is `None`.
pub struct FakeRates(pub Option<CurrencyRates>);

#[async_trait]
impl RateProvider for FakeRates {
    async fn current_rates(&self) -> Result<CurrencyRates, RateError> {
        self.0.clone().ok_or(RateError::Unparseable("USD"))
    }
}

pub fn sample_rates() -> CurrencyRates {
    CurrencyRates {
        usd: "36.85".to_string(),
        eur: "40.13".to_string(),
        source: "CME".to_string(),
        rate_type: "We Sell".to_string(),
        business_date: None,
        updated_time: None,
    }
}

/// App wired to a fresh database in a temp dir.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub pdf: Arc<FakePdf>,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_rates(Some(sample_rates())).await
    }

    pub async fn with_rates(rates: Option<CurrencyRates>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("invoices.db"), 2).await.unwrap();
        let pdf = Arc::new(FakePdf::default());
        let state = AppState {
            store: Arc::new(store),
            pdf: pdf.clone(),
            rates: Arc::new(FakeRates(rates)),
            base_url: "http://127.0.0.1:5000".to_string(),
        };
        Self {
            router: create_router(state.clone()),
            state,
            pdf,
            dir,
        }
    }

    pub async fn raw(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.raw(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Creates a client and returns its id.
    pub async fn client(&self, name: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/api/clients",
                Some(serde_json::json!({ "contact_person": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["client_id"].as_i64().unwrap()
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}
