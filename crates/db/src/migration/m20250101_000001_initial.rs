//! Initial schema: company, clients, invoices, invoice items.
//!
//! Uses `IF NOT EXISTS` throughout so databases created before migrations
//! were tracked pass through untouched.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS invoice_items;
             DROP TABLE IF EXISTS invoices;
             DROP TABLE IF EXISTS clients;
             DROP TABLE IF EXISTS company;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Issuing company, a single row pinned to id 1
CREATE TABLE IF NOT EXISTS company (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    name TEXT,
    address TEXT,
    email TEXT,
    phone TEXT,
    bank_info_1 TEXT,
    bank_info_2 TEXT
);

CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_person TEXT,
    email TEXT,
    phone TEXT,
    address TEXT
);

-- client_id is deliberately not a foreign key: deleting a client keeps its invoices
CREATE TABLE IF NOT EXISTS invoices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    invoice_number TEXT NOT NULL,
    client_id INTEGER,
    project TEXT,
    status TEXT NOT NULL DEFAULT 'Unpaid',
    invoice_date TEXT NOT NULL,
    subtotal REAL NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TEXT,
    paid_at TEXT,
    advance_paid_at TEXT
);

-- Daily numbering counts invoices per date
CREATE INDEX IF NOT EXISTS idx_invoices_invoice_date ON invoices(invoice_date);

CREATE TABLE IF NOT EXISTS invoice_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    invoice_id INTEGER NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT,
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    total REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_invoice_items_invoice ON invoice_items(invoice_id);
";
