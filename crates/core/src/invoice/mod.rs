//! Invoice domain types.
//!
//! This module provides the values that flow between the store, the
//! aggregator, and the renderer:
//! - Invoices and their payment status
//! - Line items
//! - Clients and the company profile

pub mod types;

pub use types::{Client, CompanyProfile, Invoice, InvoiceStatus, LineItem, ParseStatusError};
