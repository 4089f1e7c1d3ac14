//! Payment timestamp side effects of status changes.
//!
//! Moving an invoice into `Paid` or `Advance` stamps the matching timestamp
//! unless the caller supplied one. Explicit values, including an explicit
//! clear, always win. Leaving a status never clears its timestamp.

use chrono::{DateTime, Utc};

use crate::invoice::InvoiceStatus;

/// Nullable timestamp change: `None` leaves the column alone,
/// `Some(None)` clears it, `Some(Some(t))` sets it.
pub type TimestampChange = Option<Option<DateTime<Utc>>>;

/// Status and timestamp fields a caller wants to change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentUpdate {
    /// New status.
    pub status: Option<InvoiceStatus>,
    /// Explicit `paid_at`.
    pub paid_at: TimestampChange,
    /// Explicit `advance_paid_at`.
    pub advance_paid_at: TimestampChange,
    /// Explicit `created_at`.
    pub created_at: TimestampChange,
}

impl PaymentUpdate {
    /// Returns true when no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.paid_at.is_none()
            && self.advance_paid_at.is_none()
            && self.created_at.is_none()
    }
}

/// Timestamp columns to write, after auto-stamping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampChanges {
    /// New `paid_at`.
    pub paid_at: TimestampChange,
    /// New `advance_paid_at`.
    pub advance_paid_at: TimestampChange,
    /// New `created_at`.
    pub created_at: TimestampChange,
}

/// Works out which timestamp columns an update writes.
///
/// `current` is the status stored before the update. Re-sending the status
/// an invoice already has does not move its timestamp.
#[must_use]
pub fn resolve_payment_timestamps(
    current: InvoiceStatus,
    update: &PaymentUpdate,
    now: DateTime<Utc>,
) -> TimestampChanges {
    let mut changes = TimestampChanges::default();

    match update.status {
        Some(InvoiceStatus::Paid)
            if update.paid_at.is_none() && current != InvoiceStatus::Paid =>
        {
            changes.paid_at = Some(Some(now));
        }
        Some(InvoiceStatus::Advance)
            if update.advance_paid_at.is_none() && current != InvoiceStatus::Advance =>
        {
            changes.advance_paid_at = Some(Some(now));
        }
        _ => {}
    }

    if update.paid_at.is_some() {
        changes.paid_at = update.paid_at;
    }
    if update.advance_paid_at.is_some() {
        changes.advance_paid_at = update.advance_paid_at;
    }
    if update.created_at.is_some() {
        changes.created_at = update.created_at;
    }

    changes
}
