//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and run on every
//! connection open, so a freshly imported database is brought up to date
//! before it serves requests.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_initial;
mod m20250101_000002_legacy_columns;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_initial::Migration),
            Box::new(m20250101_000002_legacy_columns::Migration),
        ]
    }
}
