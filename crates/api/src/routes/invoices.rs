//! Invoice routes.
//!
//! Request bodies accept `null` for the nullable timestamps: an absent field
//! leaves the column alone, `null` clears it.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};
use invoicer_core::billing::{PaymentUpdate, PortfolioStats};
use invoicer_core::invoice::{InvoiceStatus, LineItem};
use invoicer_db::{
    CreateInvoiceInput, InvoiceDetail, InvoiceRepository, InvoiceSummary, UpdateInvoiceInput,
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/stats/overview", get(stats_overview))
        .route(
            "/invoices/{id}",
            get(get_invoice)
                .patch(patch_invoice)
                .put(update_invoice)
                .delete(delete_invoice),
        )
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Billed client, required.
    pub client_id: Option<i32>,
    /// Project name.
    pub project: Option<String>,
    /// Initial status, `Unpaid` when omitted.
    pub status: Option<InvoiceStatus>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Request body for changing status and payment timestamps.
#[derive(Debug, Deserialize)]
pub struct PatchInvoiceRequest {
    /// New status.
    pub status: Option<InvoiceStatus>,
    /// Explicit paid timestamp.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub paid_at: Option<Option<DateTime<Utc>>>,
    /// Explicit deposit timestamp.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub advance_paid_at: Option<Option<DateTime<Utc>>>,
    /// Explicit creation timestamp.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub created_at: Option<Option<DateTime<Utc>>>,
}

/// Request body for replacing an invoice.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// Billed client, required.
    pub client_id: Option<i32>,
    /// New number; kept when omitted.
    pub invoice_number: Option<String>,
    /// New issue date; kept when omitted.
    pub invoice_date: Option<NaiveDate>,
    /// Project name.
    pub project: Option<String>,
    /// Status, `Unpaid` when omitted.
    pub status: Option<InvoiceStatus>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Replacement line items.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Explicit creation timestamp.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub created_at: Option<Option<DateTime<Utc>>>,
    /// Explicit paid timestamp.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub paid_at: Option<Option<DateTime<Utc>>>,
    /// Explicit deposit timestamp.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub advance_paid_at: Option<Option<DateTime<Utc>>>,
}

impl From<PatchInvoiceRequest> for PaymentUpdate {
    fn from(req: PatchInvoiceRequest) -> Self {
        Self {
            status: req.status,
            paid_at: req.paid_at,
            advance_paid_at: req.advance_paid_at,
            created_at: req.created_at,
        }
    }
}

impl From<UpdateInvoiceRequest> for UpdateInvoiceInput {
    fn from(req: UpdateInvoiceRequest) -> Self {
        Self {
            client_id: req.client_id,
            invoice_number: req.invoice_number.filter(|n| !n.trim().is_empty()),
            invoice_date: req.invoice_date,
            project: req.project.unwrap_or_default(),
            status: req.status.unwrap_or_default(),
            notes: req.notes.unwrap_or_default(),
            items: req.items,
            created_at: req.created_at,
            paid_at: req.paid_at,
            advance_paid_at: req.advance_paid_at,
        }
    }
}

/// POST `/invoices` - Create an invoice dated today with the next number.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<Json<Value>, ApiError> {
    let input = CreateInvoiceInput {
        client_id: payload.client_id,
        project: payload.project.unwrap_or_default(),
        status: payload.status.unwrap_or_default(),
        notes: payload.notes.unwrap_or_default(),
        items: payload.items,
    };

    let db = state.store.read().await;
    let created = InvoiceRepository::new(db.clone())
        .create(input, Local::now().date_naive(), Utc::now())
        .await?;

    Ok(Json(json!({
        "success": true,
        "invoice_number": created.invoice_number,
        "invoice_id": created.invoice_id,
    })))
}

/// GET `/invoices` - All invoices, newest first.
async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceSummary>>, ApiError> {
    let db = state.store.read().await;
    let invoices = InvoiceRepository::new(db.clone()).list().await?;
    Ok(Json(invoices))
}

/// GET `/invoices/{id}` - Header plus items.
async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    let db = state.store.read().await;
    InvoiceRepository::new(db.clone())
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Invoice {id} not found")))
}

/// PATCH `/invoices/{id}` - Status and payment timestamps only.
async fn patch_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PatchInvoiceRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    let invoice = InvoiceRepository::new(db.clone())
        .patch(id, payload.into(), Utc::now())
        .await?;
    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

/// PUT `/invoices/{id}` - Replace header and items.
async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    let invoice = InvoiceRepository::new(db.clone())
        .replace(id, payload.into(), Utc::now())
        .await?;
    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

/// DELETE `/invoices/{id}`
async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    InvoiceRepository::new(db.clone()).delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET `/invoices/stats/overview`
async fn stats_overview(State(state): State<AppState>) -> Result<Json<PortfolioStats>, ApiError> {
    let db = state.store.read().await;
    let stats = InvoiceRepository::new(db.clone()).stats().await?;
    Ok(Json(stats))
}
