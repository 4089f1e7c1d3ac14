//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod client;
pub mod company;
pub mod invoice;

#[cfg(test)]
mod invoice_tests;

pub use client::{ClientError, ClientInput, ClientRepository};
pub use company::CompanyRepository;
pub use invoice::{
    CreateInvoiceInput, CreatedInvoice, InvoiceDetail, InvoiceDocument, InvoiceError,
    InvoiceRepository, InvoiceSummary, UpdateInvoiceInput,
};
