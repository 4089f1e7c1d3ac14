//! Printable invoice documents: HTML preview and PDF download.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
};

use crate::{AppState, error::ApiError};
use invoicer_core::document::{attachment_filename, render_invoice};
use invoicer_db::{CompanyRepository, InvoiceRepository};

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/{id}/preview", get(preview_invoice))
        .route("/invoices/{id}/pdf/{label}", get(download_pdf))
}

/// GET `/invoices/{id}/preview` - The invoice as a printable HTML page.
async fn preview_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ApiError> {
    let db = state.store.read().await;
    let document = InvoiceRepository::new(db.clone())
        .find_document(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Invoice {id} not found")))?;
    let company = CompanyRepository::new(db.clone()).load().await?;

    Ok(Html(render_invoice(
        &document.invoice,
        document.client.as_ref(),
        &company,
        &document.items,
    )))
}

/// GET `/invoices/{id}/pdf/{label}` - Prints the preview page to PDF.
async fn download_pdf(
    State(state): State<AppState>,
    Path((id, label)): Path<(i32, String)>,
) -> Result<impl IntoResponse, ApiError> {
    // The browser fetches the preview through this server, so the read guard
    // must be released before converting.
    {
        let db = state.store.read().await;
        if InvoiceRepository::new(db.clone())
            .find_by_id(id)
            .await?
            .is_none()
        {
            return Err(ApiError::not_found(format!("Invoice {id} not found")));
        }
    }

    let url = format!("{}/api/invoices/{id}/preview", state.base_url);
    let pdf = state.pdf.convert(&url).await?;
    let filename = attachment_filename(&label);
    tracing::info!(invoice_id = id, filename = %filename, size = pdf.len(), "PDF generated");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    ))
}
