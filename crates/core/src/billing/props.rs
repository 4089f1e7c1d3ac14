//! Property-based tests for billing.
//!
//! - Subtotal agrees with the amount the document renderer bills
//! - Portfolio statistics split every subtotal exactly once

use proptest::prelude::*;

use super::stats::PortfolioStats;
use super::totals::{subtotal, validate_items};
use crate::document::render::due_amount;
use crate::invoice::{InvoiceStatus, LineItem};

/// Strategy for valid line items (price up to 100,000.00 in cents).
fn line_item() -> impl Strategy<Value = LineItem> {
    (1i64..1_000, 0u32..10_000_000, proptest::option::of("[a-z ]{0,20}")).prop_map(
        |(quantity, cents, description)| LineItem {
            title: "Work".to_string(),
            description,
            quantity,
            unit_price: f64::from(cents) / 100.0,
        },
    )
}

fn status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Unpaid),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Advance),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The stored subtotal and the rendered due amount are the same number.
    #[test]
    fn prop_subtotal_matches_rendered_total(items in prop::collection::vec(line_item(), 0..20)) {
        prop_assert!(validate_items(&items).is_ok());
        let stored = subtotal(&items);
        let billed = due_amount(&items);
        prop_assert!((stored - billed).abs() < 1e-6, "{} != {}", stored, billed);
    }

    /// Revenue plus outstanding always accounts for the whole portfolio.
    #[test]
    fn prop_stats_partition_portfolio(
        invoices in prop::collection::vec((status(), 0.0f64..1_000_000.0), 0..50),
    ) {
        let stats = PortfolioStats::from_invoices(invoices.iter().copied());
        let whole: f64 = invoices.iter().map(|(_, s)| s).sum();
        prop_assert!((stats.total_revenue + stats.outstanding_amount - whole).abs() < 1e-3);

        let open = invoices
            .iter()
            .filter(|(s, _)| *s != InvoiceStatus::Paid)
            .count() as u64;
        prop_assert_eq!(stats.unpaid_count, open);
    }
}
