//! Invoice repository for database operations.
//!
//! Creation assigns the daily number and writes the header and items in one
//! transaction. Full updates replace the header and every item in one
//! transaction, so `subtotal` always equals the sum of the stored item totals.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use invoicer_core::billing::{
    BillingError, PaymentUpdate, PortfolioStats, TimestampChanges, resolve_payment_timestamps,
    subtotal, validate_items,
};
use invoicer_core::invoice::{Client, Invoice, InvoiceStatus, LineItem};
use invoicer_core::numbering::format_invoice_number;

use crate::entities::{clients, invoice_items, invoices, sea_orm_active_enums};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice {0} not found")]
    NotFound(i32),

    /// No client given.
    #[error("client_id is required")]
    MissingClient,

    /// The referenced client does not exist.
    #[error("Client {0} does not exist")]
    UnknownClient(i32),

    /// A line item failed validation.
    #[error(transparent)]
    InvalidItem(#[from] BillingError),

    /// A partial update carried no fields.
    #[error("No fields to update")]
    NoFieldsToUpdate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Default)]
pub struct CreateInvoiceInput {
    /// Billed client; must exist.
    pub client_id: Option<i32>,
    /// Project name.
    pub project: String,
    /// Initial status.
    pub status: InvoiceStatus,
    /// Free-form notes.
    pub notes: String,
    /// Line items.
    pub items: Vec<LineItem>,
}

/// Input for replacing an invoice header and all of its items.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// Billed client; required but may reference a deleted client.
    pub client_id: Option<i32>,
    /// New number. The stored number is kept when `None`.
    pub invoice_number: Option<String>,
    /// New issue date. The stored date is kept when `None`.
    pub invoice_date: Option<NaiveDate>,
    /// Project name.
    pub project: String,
    /// New status.
    pub status: InvoiceStatus,
    /// Free-form notes.
    pub notes: String,
    /// Replacement line items.
    pub items: Vec<LineItem>,
    /// Explicit `created_at` change.
    pub created_at: Option<Option<DateTime<Utc>>>,
    /// Explicit `paid_at` change.
    pub paid_at: Option<Option<DateTime<Utc>>>,
    /// Explicit `advance_paid_at` change.
    pub advance_paid_at: Option<Option<DateTime<Utc>>>,
}

/// Number and ID of a freshly created invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedInvoice {
    /// Invoice ID.
    pub invoice_id: i32,
    /// Assigned number.
    pub invoice_number: String,
}

/// One row of the invoice list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    /// Invoice ID.
    pub id: i32,
    /// Invoice number.
    pub invoice_number: String,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Payment status.
    pub status: InvoiceStatus,
    /// Project name.
    pub project: String,
    /// Billed client ID.
    pub client_id: Option<i32>,
    /// Client contact person, if the client still exists.
    pub contact_person: Option<String>,
    /// Invoice subtotal.
    pub total: f64,
}

/// An invoice with its stored items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetail {
    /// Header fields.
    #[serde(flatten)]
    pub invoice: Invoice,
    /// Stored items, in insertion order.
    pub items: Vec<invoice_items::Model>,
}

/// Everything the document renderer needs except the company profile.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    /// Header fields.
    pub invoice: Invoice,
    /// Billed client; `None` when the reference dangles.
    pub client: Option<Client>,
    /// Line items, in insertion order.
    pub items: Vec<LineItem>,
}

impl From<invoices::Model> for Invoice {
    fn from(model: invoices::Model) -> Self {
        Self {
            id: model.id,
            invoice_number: model.invoice_number,
            client_id: model.client_id,
            project: model.project.unwrap_or_default(),
            status: model.status.into(),
            invoice_date: model.invoice_date,
            subtotal: model.subtotal,
            notes: model.notes.unwrap_or_default(),
            created_at: model.created_at,
            paid_at: model.paid_at,
            advance_paid_at: model.advance_paid_at,
        }
    }
}

impl From<invoice_items::Model> for LineItem {
    fn from(model: invoice_items::Model) -> Self {
        Self {
            title: model.title,
            description: model.description,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}

/// Counts invoices already dated `date`.
async fn count_for_date<C: ConnectionTrait>(conn: &C, date: NaiveDate) -> Result<u64, DbErr> {
    invoices::Entity::find()
        .filter(invoices::Column::InvoiceDate.eq(date))
        .count(conn)
        .await
}

/// Inserts items for an invoice.
async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
    items: &[LineItem],
) -> Result<(), DbErr> {
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|item| invoice_items::ActiveModel {
        id: NotSet,
        invoice_id: Set(invoice_id),
        title: Set(item.title.clone()),
        description: Set(item.description.clone()),
        quantity: Set(item.quantity),
        unit_price: Set(item.unit_price),
        total: Set(item.total()),
    });
    invoice_items::Entity::insert_many(rows).exec(conn).await?;
    Ok(())
}

/// Writes resolved timestamp changes onto an active model.
fn apply_timestamps(active: &mut invoices::ActiveModel, changes: TimestampChanges) {
    if let Some(paid_at) = changes.paid_at {
        active.paid_at = Set(paid_at);
    }
    if let Some(advance_paid_at) = changes.advance_paid_at {
        active.advance_paid_at = Set(advance_paid_at);
    }
    if let Some(created_at) = changes.created_at {
        active.created_at = Set(created_at);
    }
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

/// Makes the transaction a writer before it reads. SQLite cannot upgrade a
/// deferred reader once another connection has committed, and the day's
/// count must not change between reading it and inserting.
async fn take_write_lock<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    conn.execute_unprepared("UPDATE invoices SET id = id WHERE id < 0")
        .await?;
    Ok(())
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the number the next invoice dated `today` would receive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn next_invoice_number(&self, today: NaiveDate) -> Result<String, DbErr> {
        let issued = count_for_date(&self.db, today).await?;
        Ok(format_invoice_number(today, issued))
    }

    /// Creates an invoice dated `today`, assigning its number.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing or unknown, an item is
    /// invalid, or the transaction fails.
    pub async fn create(
        &self,
        input: CreateInvoiceInput,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CreatedInvoice, InvoiceError> {
        let client_id = input.client_id.ok_or(InvoiceError::MissingClient)?;
        validate_items(&input.items)?;

        let txn = self.db.begin().await?;
        take_write_lock(&txn).await?;

        if clients::Entity::find_by_id(client_id).one(&txn).await?.is_none() {
            return Err(InvoiceError::UnknownClient(client_id));
        }

        let issued = count_for_date(&txn, today).await?;
        let invoice_number = format_invoice_number(today, issued);

        let stamps = resolve_payment_timestamps(
            InvoiceStatus::Unpaid,
            &PaymentUpdate {
                status: Some(input.status),
                ..PaymentUpdate::default()
            },
            now,
        );

        let mut header = invoices::ActiveModel {
            id: NotSet,
            invoice_number: Set(invoice_number.clone()),
            client_id: Set(Some(client_id)),
            project: Set(Some(input.project)),
            status: Set(input.status.into()),
            invoice_date: Set(today),
            subtotal: Set(subtotal(&input.items)),
            notes: Set(Some(input.notes)),
            created_at: Set(Some(now)),
            paid_at: Set(None),
            advance_paid_at: Set(None),
        };
        apply_timestamps(&mut header, stamps);

        let inserted = header.insert(&txn).await?;
        insert_items(&txn, inserted.id, &input.items).await?;
        txn.commit().await?;

        tracing::info!(
            invoice_id = inserted.id,
            invoice_number = %invoice_number,
            items = input.items.len(),
            "Invoice created"
        );

        Ok(CreatedInvoice {
            invoice_id: inserted.id,
            invoice_number,
        })
    }

    /// Lists invoices with client names, newest date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<InvoiceSummary>, DbErr> {
        let rows = invoices::Entity::find()
            .find_also_related(clients::Entity)
            .order_by_desc(invoices::Column::InvoiceDate)
            .order_by_desc(invoices::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(invoice, client)| InvoiceSummary {
                id: invoice.id,
                invoice_number: invoice.invoice_number,
                invoice_date: invoice.invoice_date,
                status: invoice.status.into(),
                project: invoice.project.unwrap_or_default(),
                client_id: invoice.client_id,
                contact_person: client.and_then(|c| c.contact_person),
                total: invoice.subtotal,
            })
            .collect())
    }

    async fn items_of<C: ConnectionTrait>(
        conn: &C,
        invoice_id: i32,
    ) -> Result<Vec<invoice_items::Model>, DbErr> {
        invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_items::Column::Id)
            .all(conn)
            .await
    }

    /// Finds an invoice with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<InvoiceDetail>, DbErr> {
        let Some(model) = invoices::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let items = Self::items_of(&self.db, id).await?;
        Ok(Some(InvoiceDetail {
            invoice: model.into(),
            items,
        }))
    }

    /// Loads an invoice, its client and items for rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_document(&self, id: i32) -> Result<Option<InvoiceDocument>, DbErr> {
        let Some((model, client)) = invoices::Entity::find_by_id(id)
            .find_also_related(clients::Entity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let items = Self::items_of(&self.db, id).await?;
        Ok(Some(InvoiceDocument {
            invoice: model.into(),
            client: client.map(Client::from),
            items: items.into_iter().map(LineItem::from).collect(),
        }))
    }

    /// Applies a partial status/timestamp update.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is empty, the invoice does not exist,
    /// or the write fails.
    pub async fn patch(
        &self,
        id: i32,
        update: PaymentUpdate,
        now: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        if update.is_empty() {
            return Err(InvoiceError::NoFieldsToUpdate);
        }

        let existing = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let changes = resolve_payment_timestamps(existing.status.into(), &update, now);
        let mut active: invoices::ActiveModel = existing.into();
        if let Some(status) = update.status {
            active.status = Set(status.into());
        }
        apply_timestamps(&mut active, changes);

        let updated = active.update(&self.db).await?;
        tracing::info!(invoice_id = id, status = ?updated.status, "Invoice patched");
        Ok(updated.into())
    }

    /// Replaces the header and every item of an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing, an item is invalid, the
    /// invoice does not exist, or the transaction fails.
    pub async fn replace(
        &self,
        id: i32,
        input: UpdateInvoiceInput,
        now: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let client_id = input.client_id.ok_or(InvoiceError::MissingClient)?;
        validate_items(&input.items)?;

        let txn = self.db.begin().await?;

        let existing = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let changes = resolve_payment_timestamps(
            existing.status.into(),
            &PaymentUpdate {
                status: Some(input.status),
                paid_at: input.paid_at,
                advance_paid_at: input.advance_paid_at,
                created_at: input.created_at,
            },
            now,
        );

        let mut active: invoices::ActiveModel = existing.into();
        active.client_id = Set(Some(client_id));
        if let Some(number) = input.invoice_number {
            active.invoice_number = Set(number);
        }
        if let Some(date) = input.invoice_date {
            active.invoice_date = Set(date);
        }
        active.project = Set(Some(input.project));
        active.status = Set(input.status.into());
        active.notes = Set(Some(input.notes));
        active.subtotal = Set(subtotal(&input.items));
        apply_timestamps(&mut active, changes);

        let updated = active.update(&txn).await?;

        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        insert_items(&txn, id, &input.items).await?;
        txn.commit().await?;

        tracing::info!(invoice_id = id, items = input.items.len(), "Invoice replaced");
        Ok(updated.into())
    }

    /// Deletes an invoice and its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice does not exist or the transaction fails.
    pub async fn delete(&self, id: i32) -> Result<(), InvoiceError> {
        let txn = self.db.begin().await?;

        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        let result = invoices::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(InvoiceError::NotFound(id));
        }
        txn.commit().await?;

        tracing::info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }

    /// Computes dashboard statistics over every invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stats(&self) -> Result<PortfolioStats, DbErr> {
        let rows: Vec<(sea_orm_active_enums::InvoiceStatus, f64)> = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::Status)
            .column(invoices::Column::Subtotal)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(PortfolioStats::from_invoices(
            rows.into_iter().map(|(status, amount)| (status.into(), amount)),
        ))
    }
}
