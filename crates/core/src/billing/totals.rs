//! Line totals and subtotals.
//!
//! Amounts are plain `f64` with no rounding at storage time. Two-decimal
//! rounding happens only when a value is displayed.

use super::error::BillingError;
use crate::invoice::LineItem;

/// Returns `quantity * unit_price`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn line_total(quantity: i64, unit_price: f64) -> f64 {
    quantity as f64 * unit_price
}

/// Returns the sum of all line totals.
#[must_use]
pub fn subtotal(items: &[LineItem]) -> f64 {
    items
        .iter()
        .map(|item| line_total(item.quantity, item.unit_price))
        .sum()
}

/// Checks every item has a positive quantity and a non-negative price.
///
/// # Errors
///
/// Returns the first offending item.
pub fn validate_items(items: &[LineItem]) -> Result<(), BillingError> {
    for (index, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            return Err(BillingError::NonPositiveQuantity {
                index,
                quantity: item.quantity,
            });
        }
        if !item.unit_price.is_finite() {
            return Err(BillingError::NonFiniteUnitPrice { index });
        }
        if item.unit_price < 0.0 {
            return Err(BillingError::NegativeUnitPrice {
                index,
                unit_price: item.unit_price,
            });
        }
    }
    Ok(())
}
