//! Core invoicing logic for Invoicer.
//!
//! This crate contains pure business logic with no web framework or database
//! dependencies. Domain types, validation rules, and calculations live here,
//! along with the two outbound collaborators the API injects: the PDF
//! converter and the exchange rate provider.
//!
//! # Modules
//!
//! - `invoice` - Invoice, line item, client, and company types
//! - `numbering` - Daily sequential invoice numbers
//! - `billing` - Line totals, subtotals, portfolio statistics, payment timestamps
//! - `document` - HTML rendering and PDF conversion
//! - `rates` - Currency rate lookup

pub mod billing;
pub mod document;
pub mod invoice;
pub mod numbering;
pub mod rates;
