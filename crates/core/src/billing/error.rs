//! Billing validation errors.

use thiserror::Error;

/// Errors raised while validating invoice contents.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BillingError {
    /// Quantity must be a positive integer.
    #[error("Item {index}: quantity must be greater than zero, got {quantity}")]
    NonPositiveQuantity {
        /// Zero-based item position.
        index: usize,
        /// Rejected quantity.
        quantity: i64,
    },

    /// Unit price must be zero or more.
    #[error("Item {index}: unit price cannot be negative, got {unit_price}")]
    NegativeUnitPrice {
        /// Zero-based item position.
        index: usize,
        /// Rejected price.
        unit_price: f64,
    },

    /// Unit price must be a finite number.
    #[error("Item {index}: unit price must be a finite number")]
    NonFiniteUnitPrice {
        /// Zero-based item position.
        index: usize,
    },
}
