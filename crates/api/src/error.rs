//! Maps domain errors onto HTTP responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`
//! with the status from [`AppError::status_code`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use invoicer_core::document::PdfError;
use invoicer_core::rates::RateError;
use invoicer_db::{ClientError, InvoiceError, StoreError};
use invoicer_shared::AppError;
use sea_orm::DbErr;

/// Handler error carrying the shared error taxonomy.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Shorthand for a 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::NotFound(message.into()))
    }

    /// Shorthand for a 400.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_client_error() {
            tracing::debug!(error = %err, "Request rejected");
        } else {
            tracing::error!(error = %err, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": err.message(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        let message = err.to_string();
        Self(match err {
            InvoiceError::NotFound(_) => AppError::NotFound(message),
            InvoiceError::MissingClient
            | InvoiceError::UnknownClient(_)
            | InvoiceError::InvalidItem(_)
            | InvoiceError::NoFieldsToUpdate => AppError::Validation(message),
            InvoiceError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        Self(match err {
            ClientError::NotFound(_) => AppError::NotFound(message),
            ClientError::MissingContactPerson => AppError::Validation(message),
            ClientError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        Self(match err {
            StoreError::NotADatabase | StoreError::InvalidBackupName(_) => {
                AppError::Validation(message)
            }
            StoreError::BackupNotFound(_) | StoreError::FileNotFound => {
                AppError::NotFound(message)
            }
            StoreError::Reopen(_) | StoreError::Database(_) => AppError::Database(message),
            StoreError::Io(_) => AppError::Internal(message),
        })
    }
}

impl From<PdfError> for ApiError {
    fn from(err: PdfError) -> Self {
        Self(AppError::Document(err.to_string()))
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        Self(AppError::ExternalService(err.to_string()))
    }
}
