//! Demo data seeder for Invoicer development.
//!
//! Seeds a company profile, a few clients and one invoice per status into the
//! configured database. Does nothing if clients already exist.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Local, Utc};
use sea_orm::DatabaseConnection;

use invoicer_core::billing::PaymentUpdate;
use invoicer_core::invoice::{CompanyProfile, InvoiceStatus, LineItem};
use invoicer_db::{
    ClientInput, ClientRepository, CompanyRepository, CreateInvoiceInput, InvoiceRepository,
};
use invoicer_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Opening {}...", config.database.path.display());
    if let Some(parent) = config.database.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let db = invoicer_db::connect_and_migrate(&config.database.path, 1).await?;

    if !ClientRepository::new(db.clone()).list().await?.is_empty() {
        println!("  Clients already exist, skipping...");
        return Ok(());
    }

    println!("Seeding company profile...");
    seed_company(&db).await?;

    println!("Seeding clients...");
    let client_ids = seed_clients(&db).await?;

    println!("Seeding invoices...");
    seed_invoices(&db, &client_ids).await?;

    db.close().await?;
    println!("Seeding complete!");
    Ok(())
}

async fn seed_company(db: &DatabaseConnection) -> anyhow::Result<()> {
    let profile = CompanyProfile {
        name: "Demo Studio".to_string(),
        address: "Keizerstraat 1\nParamaribo".to_string(),
        email: "billing@demo.studio".to_string(),
        phone: "+597 400 000".to_string(),
        bank_info_1: "Demo Bank USD\nAccount 1234567".to_string(),
        bank_info_2: "Demo Bank EUR\nAccount 7654321".to_string(),
    };
    CompanyRepository::new(db.clone()).save(&profile).await?;
    println!("  Saved company: {}", profile.name);
    Ok(())
}

async fn seed_clients(db: &DatabaseConnection) -> anyhow::Result<Vec<i32>> {
    let repo = ClientRepository::new(db.clone());
    let clients = [
        ("Maria Lopez", "maria@example.com", "12 Palm Street"),
        ("John Baker", "john@example.com", "4 Harbour Road"),
        ("Anita Ramdin", "anita@example.com", "88 Canal Avenue"),
    ];

    let mut ids = Vec::with_capacity(clients.len());
    for (name, email, address) in clients {
        let id = repo
            .create(ClientInput {
                contact_person: name.to_string(),
                email: Some(email.to_string()),
                phone: None,
                address: Some(address.to_string()),
            })
            .await?;
        println!("  Created client {id}: {name}");
        ids.push(id);
    }
    Ok(ids)
}

async fn seed_invoices(db: &DatabaseConnection, client_ids: &[i32]) -> anyhow::Result<()> {
    let repo = InvoiceRepository::new(db.clone());
    let today = Local::now().date_naive();
    let plans = [
        (0, "Website redesign", InvoiceStatus::Paid, 14),
        (1, "Monthly hosting", InvoiceStatus::Unpaid, 3),
        (2, "Brand identity", InvoiceStatus::Advance, 0),
        (0, "Maintenance", InvoiceStatus::Unpaid, 0),
    ];

    for (client, project, status, days_ago) in plans {
        let Some(&client_id) = client_ids.get(client) else {
            continue;
        };
        let items = vec![
            LineItem {
                title: format!("{project} - design"),
                description: Some("Discovery\nMockups".to_string()),
                quantity: 1,
                unit_price: 450.0,
            },
            LineItem {
                title: format!("{project} - hours"),
                description: None,
                quantity: 6,
                unit_price: 35.0,
            },
        ];

        let created = repo
            .create(
                CreateInvoiceInput {
                    client_id: Some(client_id),
                    project: project.to_string(),
                    status: InvoiceStatus::Unpaid,
                    notes: String::new(),
                    items,
                },
                today - Duration::days(days_ago),
                Utc::now() - Duration::days(days_ago),
            )
            .await?;

        if status != InvoiceStatus::Unpaid {
            repo.patch(
                created.invoice_id,
                PaymentUpdate {
                    status: Some(status),
                    ..PaymentUpdate::default()
                },
                Utc::now(),
            )
            .await?;
        }
        println!("  Created {} ({status})", created.invoice_number);
    }
    Ok(())
}
