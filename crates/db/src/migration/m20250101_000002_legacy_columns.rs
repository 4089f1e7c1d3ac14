//! Backfills columns missing from databases written by older app versions.
//!
//! Those databases have the base tables but may lack the project and
//! payment timestamp columns on `invoices` and the bank details on
//! `company`. SQLite has no `ADD COLUMN IF NOT EXISTS`, so the existing
//! columns are read from `PRAGMA table_info` first.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

const LEGACY_COLUMNS: &[(&str, &str)] = &[
    ("invoices", "project"),
    ("invoices", "created_at"),
    ("invoices", "paid_at"),
    ("invoices", "advance_paid_at"),
    ("company", "bank_info_1"),
    ("company", "bank_info_2"),
];

async fn existing_columns<C: ConnectionTrait>(db: &C, table: &str) -> Result<Vec<String>, DbErr> {
    let rows = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (table, column) in LEGACY_COLUMNS {
            let columns = existing_columns(db, table).await?;
            if columns.iter().any(|c| c == column) {
                continue;
            }
            db.execute_unprepared(&format!("ALTER TABLE {table} ADD COLUMN {column} TEXT"))
                .await?;
            tracing::info!(table = %table, column = %column, "Added missing column");
        }
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Columns are part of the current schema; nothing to undo.
        Ok(())
    }
}
