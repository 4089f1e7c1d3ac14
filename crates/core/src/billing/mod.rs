//! Financial aggregation for invoices.
//!
//! This module implements:
//! - Line totals and invoice subtotals
//! - Line item validation
//! - Portfolio statistics across all invoices
//! - Payment timestamp side effects of status changes

pub mod error;
pub mod payment;
pub mod stats;
pub mod totals;

#[cfg(test)]
mod props;

pub use error::BillingError;
pub use payment::{PaymentUpdate, TimestampChanges, resolve_payment_timestamps};
pub use stats::PortfolioStats;
pub use totals::{line_total, subtotal, validate_items};
