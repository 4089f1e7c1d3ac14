//! `SeaORM` entity definitions.

pub mod prelude;

pub mod clients;
pub mod company;
pub mod invoice_items;
pub mod invoices;
pub mod sea_orm_active_enums;
