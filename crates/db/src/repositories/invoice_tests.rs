//! Integration tests for `InvoiceRepository` against in-memory SQLite.

#![allow(clippy::float_cmp)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait};
use sea_orm_migration::MigratorTrait;

use invoicer_core::billing::PaymentUpdate;
use invoicer_core::invoice::{InvoiceStatus, LineItem};

use super::client::{ClientInput, ClientRepository};
use super::invoice::{CreateInvoiceInput, InvoiceError, InvoiceRepository, UpdateInvoiceInput};
use crate::entities::invoice_items;
use crate::migration::Migrator;

/// Creates an in-memory SQLite database with the schema applied.
pub(crate) async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 14, 10, 0, 0).unwrap()
}

fn later() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 20, 16, 45, 0).unwrap()
}

fn item(title: &str, quantity: i64, unit_price: f64) -> LineItem {
    LineItem {
        title: title.to_string(),
        description: None,
        quantity,
        unit_price,
    }
}

async fn create_client(db: &DatabaseConnection, name: &str) -> i32 {
    ClientRepository::new(db.clone())
        .create(ClientInput {
            contact_person: name.to_string(),
            ..ClientInput::default()
        })
        .await
        .expect("Failed to create client")
}

fn invoice_for(client_id: i32, items: Vec<LineItem>) -> CreateInvoiceInput {
    CreateInvoiceInput {
        client_id: Some(client_id),
        project: "Website".to_string(),
        items,
        ..CreateInvoiceInput::default()
    }
}

#[tokio::test]
async fn test_create_assigns_number_and_subtotal() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());

    let created = repo
        .create(
            invoice_for(client_id, vec![item("Design", 2, 50.0), item("Hosting", 1, 25.5)]),
            today(),
            now(),
        )
        .await
        .unwrap();
    assert_eq!(created.invoice_number, "Invoice-250114A");

    let detail = repo.find_by_id(created.invoice_id).await.unwrap().unwrap();
    assert_eq!(detail.invoice.subtotal, 125.5);
    assert_eq!(detail.invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(detail.invoice.invoice_date, today());
    assert_eq!(detail.invoice.created_at, Some(now()));
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].total, 100.0);
    assert_eq!(detail.items[1].title, "Hosting");
}

#[tokio::test]
async fn test_numbering_is_sequential_per_day() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let created = repo
            .create(invoice_for(client_id, vec![]), today(), now())
            .await
            .unwrap();
        numbers.push(created.invoice_number);
    }
    assert_eq!(
        numbers,
        ["Invoice-250114A", "Invoice-250114B", "Invoice-250114C"]
    );

    let tomorrow = today().succ_opt().unwrap();
    assert_eq!(
        repo.next_invoice_number(tomorrow).await.unwrap(),
        "Invoice-250115A"
    );
    assert_eq!(
        repo.next_invoice_number(today()).await.unwrap(),
        "Invoice-250114D"
    );
}

#[tokio::test]
async fn test_numbering_past_z_repeats_z() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());

    let mut numbers = Vec::new();
    for _ in 0..28 {
        let created = repo
            .create(invoice_for(client_id, vec![]), today(), now())
            .await
            .unwrap();
        numbers.push(created.invoice_number);
    }

    for (i, letter) in ('A'..='Z').enumerate() {
        assert_eq!(numbers[i], format!("Invoice-250114{letter}"));
    }
    assert_eq!(numbers[26], "Invoice-250114Z");
    assert_eq!(numbers[27], "Invoice-250114Z");
    assert_eq!(
        repo.next_invoice_number(today()).await.unwrap(),
        "Invoice-250114Z"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = crate::connect_and_migrate(&dir.path().join("invoices.db"), 4)
        .await
        .unwrap();
    let client_id = create_client(&db, "Jane").await;

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let repo = InvoiceRepository::new(db.clone());
            tokio::spawn(async move {
                repo.create(invoice_for(client_id, vec![item("Work", 1, 10.0)]), today(), now())
                    .await
            })
        })
        .collect();

    let mut numbers = Vec::new();
    for task in tasks {
        numbers.push(task.await.unwrap().unwrap().invoice_number);
    }
    numbers.sort();
    assert_eq!(
        numbers,
        [
            "Invoice-250114A",
            "Invoice-250114B",
            "Invoice-250114C",
            "Invoice-250114D",
            "Invoice-250114E",
            "Invoice-250114F",
        ]
    );
}

#[tokio::test]
async fn test_create_rejects_missing_or_unknown_client() {
    let db = setup_db().await;
    let repo = InvoiceRepository::new(db.clone());

    let missing = CreateInvoiceInput::default();
    assert!(matches!(
        repo.create(missing, today(), now()).await,
        Err(InvoiceError::MissingClient)
    ));

    assert!(matches!(
        repo.create(invoice_for(99, vec![]), today(), now()).await,
        Err(InvoiceError::UnknownClient(99))
    ));
}

#[tokio::test]
async fn test_create_rejects_invalid_items() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());

    let result = repo
        .create(invoice_for(client_id, vec![item("Free", 0, 10.0)]), today(), now())
        .await;
    assert!(matches!(result, Err(InvoiceError::InvalidItem(_))));
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_paid_stamps_paid_at() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());

    let mut input = invoice_for(client_id, vec![item("Design", 1, 10.0)]);
    input.status = InvoiceStatus::Paid;
    let created = repo.create(input, today(), now()).await.unwrap();

    let detail = repo.find_by_id(created.invoice_id).await.unwrap().unwrap();
    assert_eq!(detail.invoice.paid_at, Some(now()));
}

#[tokio::test]
async fn test_patch_paid_sets_timestamp_and_explicit_value_wins() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());
    let a = repo
        .create(invoice_for(client_id, vec![]), today(), now())
        .await
        .unwrap();
    let b = repo
        .create(invoice_for(client_id, vec![]), today(), now())
        .await
        .unwrap();

    let auto = repo
        .patch(
            a.invoice_id,
            PaymentUpdate {
                status: Some(InvoiceStatus::Paid),
                ..PaymentUpdate::default()
            },
            later(),
        )
        .await
        .unwrap();
    assert_eq!(auto.status, InvoiceStatus::Paid);
    assert_eq!(auto.paid_at, Some(later()));

    let explicit = repo
        .patch(
            b.invoice_id,
            PaymentUpdate {
                status: Some(InvoiceStatus::Paid),
                paid_at: Some(Some(now())),
                ..PaymentUpdate::default()
            },
            later(),
        )
        .await
        .unwrap();
    assert_eq!(explicit.paid_at, Some(now()));
}

#[tokio::test]
async fn test_patch_errors() {
    let db = setup_db().await;
    let repo = InvoiceRepository::new(db);

    assert!(matches!(
        repo.patch(1, PaymentUpdate::default(), now()).await,
        Err(InvoiceError::NoFieldsToUpdate)
    ));
    assert!(matches!(
        repo.patch(
            1,
            PaymentUpdate {
                status: Some(InvoiceStatus::Advance),
                ..PaymentUpdate::default()
            },
            now()
        )
        .await,
        Err(InvoiceError::NotFound(1))
    ));
}

#[tokio::test]
async fn test_patch_clears_with_explicit_null() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());
    let created = repo
        .create(invoice_for(client_id, vec![]), today(), now())
        .await
        .unwrap();

    let patched = repo
        .patch(
            created.invoice_id,
            PaymentUpdate {
                created_at: Some(None),
                ..PaymentUpdate::default()
            },
            later(),
        )
        .await
        .unwrap();
    assert_eq!(patched.created_at, None);
    assert_eq!(patched.status, InvoiceStatus::Unpaid);
}

#[tokio::test]
async fn test_replace_swaps_items_and_recomputes_subtotal() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let other_client = create_client(&db, "Max").await;
    let repo = InvoiceRepository::new(db.clone());
    let created = repo
        .create(
            invoice_for(client_id, vec![item("Old A", 1, 10.0), item("Old B", 2, 10.0)]),
            today(),
            now(),
        )
        .await
        .unwrap();

    let updated = repo
        .replace(
            created.invoice_id,
            UpdateInvoiceInput {
                client_id: Some(other_client),
                project: "Shop".to_string(),
                status: InvoiceStatus::Advance,
                items: vec![item("New", 3, 40.0)],
                ..UpdateInvoiceInput::default()
            },
            later(),
        )
        .await
        .unwrap();

    assert_eq!(updated.subtotal, 120.0);
    assert_eq!(updated.client_id, Some(other_client));
    assert_eq!(updated.invoice_number, created.invoice_number);
    assert_eq!(updated.invoice_date, today());
    assert_eq!(updated.advance_paid_at, Some(later()));

    let detail = repo.find_by_id(created.invoice_id).await.unwrap().unwrap();
    let titles: Vec<&str> = detail.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["New"]);
    let stored_total: f64 = detail.items.iter().map(|i| i.total).sum();
    assert_eq!(detail.invoice.subtotal, stored_total);
}

#[tokio::test]
async fn test_replace_requires_client_and_existing_invoice() {
    let db = setup_db().await;
    let repo = InvoiceRepository::new(db);

    assert!(matches!(
        repo.replace(1, UpdateInvoiceInput::default(), now()).await,
        Err(InvoiceError::MissingClient)
    ));
    assert!(matches!(
        repo.replace(
            1,
            UpdateInvoiceInput {
                client_id: Some(1),
                ..UpdateInvoiceInput::default()
            },
            now()
        )
        .await,
        Err(InvoiceError::NotFound(1))
    ));
}

#[tokio::test]
async fn test_delete_removes_items() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());
    let created = repo
        .create(invoice_for(client_id, vec![item("A", 1, 1.0)]), today(), now())
        .await
        .unwrap();

    repo.delete(created.invoice_id).await.unwrap();

    assert!(repo.find_by_id(created.invoice_id).await.unwrap().is_none());
    assert!(invoice_items::Entity::find().all(&db).await.unwrap().is_empty());
    assert!(matches!(
        repo.delete(created.invoice_id).await,
        Err(InvoiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_and_document_with_dangling_client() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());
    let first = repo
        .create(invoice_for(client_id, vec![item("A", 1, 5.0)]), today(), now())
        .await
        .unwrap();
    let second = repo
        .create(
            invoice_for(client_id, vec![item("B", 2, 5.0)]),
            today().succ_opt().unwrap(),
            now(),
        )
        .await
        .unwrap();

    ClientRepository::new(db.clone()).delete(client_id).await.unwrap();

    let list = repo.list().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, second.invoice_id);
    assert_eq!(list[0].total, 10.0);
    assert!(list[0].contact_person.is_none());
    assert_eq!(list[1].id, first.invoice_id);

    let document = repo.find_document(first.invoice_id).await.unwrap().unwrap();
    assert!(document.client.is_none());
    assert_eq!(document.invoice.client_id, Some(client_id));
    assert_eq!(document.items, vec![item("A", 1, 5.0)]);
}

#[tokio::test]
async fn test_stats_over_mixed_statuses() {
    let db = setup_db().await;
    let client_id = create_client(&db, "Jane").await;
    let repo = InvoiceRepository::new(db.clone());

    for (status, price) in [
        (InvoiceStatus::Paid, 100.0),
        (InvoiceStatus::Unpaid, 200.0),
        (InvoiceStatus::Advance, 50.0),
    ] {
        let mut input = invoice_for(client_id, vec![item("Work", 1, price)]);
        input.status = status;
        repo.create(input, today(), now()).await.unwrap();
    }

    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.total_revenue, 125.0);
    assert_eq!(stats.outstanding_amount, 225.0);
    assert_eq!(stats.unpaid_count, 2);
}

#[tokio::test]
async fn test_migrations_backfill_legacy_schema() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.execute_unprepared(
        "CREATE TABLE company (id INTEGER PRIMARY KEY, name TEXT, address TEXT, email TEXT, phone TEXT);
         CREATE TABLE invoices (id INTEGER PRIMARY KEY AUTOINCREMENT, invoice_number TEXT,
             client_id INTEGER, status TEXT, invoice_date TEXT, subtotal REAL, notes TEXT);
         INSERT INTO invoices (invoice_number, client_id, status, invoice_date, subtotal, notes)
             VALUES ('Invoice-240301A', 1, 'Paid', '2024-03-01', 80.0, NULL);",
    )
    .await
    .unwrap();

    Migrator::up(&db, None).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let repo = InvoiceRepository::new(db.clone());
    let detail = repo.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(detail.invoice.project, "");
    assert_eq!(detail.invoice.paid_at, None);
    assert_eq!(detail.invoice.subtotal, 80.0);

    let company = super::company::CompanyRepository::new(db);
    assert!(company.load().await.unwrap().bank_info_2.is_empty());
}
