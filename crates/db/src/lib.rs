//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the SQLite schema
//! - Repository abstractions for data access
//! - Database migrations
//! - [`Store`], the swappable connection handle behind import and restore

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod store;

pub use repositories::{
    ClientError, ClientInput, ClientRepository, CompanyRepository, CreateInvoiceInput,
    CreatedInvoice, InvoiceDetail, InvoiceDocument, InvoiceError, InvoiceRepository,
    InvoiceSummary, UpdateInvoiceInput,
};
pub use store::{Store, StoreError, StoreStatus};

use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

/// Builds the sqlx URL for a database file, creating the file if missing.
#[must_use]
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Establishes a connection pool to a SQLite file.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(path: &Path, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(sqlite_url(path));
    options
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Connects and brings the schema up to date.
///
/// # Errors
///
/// Returns an error if connecting or migrating fails.
pub async fn connect_and_migrate(
    path: &Path,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let db = connect(path, max_connections).await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        // Release the file so a caller can put the previous one back.
        let _ = db.close().await;
        return Err(e);
    }
    Ok(db)
}
