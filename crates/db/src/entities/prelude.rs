//! Entity re-exports.

pub use super::clients::Entity as Clients;
pub use super::company::Entity as Company;
pub use super::invoice_items::Entity as InvoiceItems;
pub use super::invoices::Entity as Invoices;
