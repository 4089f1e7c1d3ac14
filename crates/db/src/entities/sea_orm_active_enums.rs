//! Database enums stored as text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use invoicer_core::invoice::InvoiceStatus as DomainStatus;

/// Invoice payment status as stored in `invoices.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum InvoiceStatus {
    /// Nothing received.
    #[sea_orm(string_value = "Unpaid")]
    Unpaid,
    /// Fully paid.
    #[sea_orm(string_value = "Paid")]
    Paid,
    /// Deposit received.
    #[sea_orm(string_value = "Advance")]
    Advance,
}

impl From<InvoiceStatus> for DomainStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Unpaid => Self::Unpaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Advance => Self::Advance,
        }
    }
}

impl From<DomainStatus> for InvoiceStatus {
    fn from(status: DomainStatus) -> Self {
        match status {
            DomainStatus::Unpaid => Self::Unpaid,
            DomainStatus::Paid => Self::Paid,
            DomainStatus::Advance => Self::Advance,
        }
    }
}
