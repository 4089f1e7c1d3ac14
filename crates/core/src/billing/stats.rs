//! Portfolio statistics across all invoices.

use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceStatus;

/// Share of an Advance invoice that counts as received.
pub const ADVANCE_SHARE: f64 = 0.5;

/// Dashboard figures.
///
/// An Advance invoice counts half towards revenue and half towards the
/// outstanding amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Paid subtotals plus half of each Advance subtotal.
    pub total_revenue: f64,
    /// Unpaid subtotals plus half of each Advance subtotal.
    pub outstanding_amount: f64,
    /// Number of Unpaid or Advance invoices.
    pub unpaid_count: u64,
}

impl PortfolioStats {
    /// Folds one invoice into the running figures.
    pub fn add(&mut self, status: InvoiceStatus, subtotal: f64) {
        match status {
            InvoiceStatus::Paid => self.total_revenue += subtotal,
            InvoiceStatus::Unpaid => {
                self.outstanding_amount += subtotal;
                self.unpaid_count += 1;
            }
            InvoiceStatus::Advance => {
                self.total_revenue += subtotal * ADVANCE_SHARE;
                self.outstanding_amount += subtotal * ADVANCE_SHARE;
                self.unpaid_count += 1;
            }
        }
    }

    /// Builds statistics from `(status, subtotal)` pairs.
    #[must_use]
    pub fn from_invoices<I>(invoices: I) -> Self
    where
        I: IntoIterator<Item = (InvoiceStatus, f64)>,
    {
        invoices
            .into_iter()
            .fold(Self::default(), |mut stats, (status, subtotal)| {
                stats.add(status, subtotal);
                stats
            })
    }
}
