//! Document totals engine.
//!
//! `subtotal = Σ quantity × unit_price`, `tax_total = Σ amount × rate / 100`,
//! `total = subtotal + tax_total`. Nothing is rounded here.

use serde::{Deserialize, Serialize};

use crate::line_item::LineItem;

/// Computed totals of a document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: f64,
    pub tax_total: f64,
    pub total: f64,
}

/// Per-line amounts, for callers that display each row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LineAmount {
    pub amount: f64,
    pub tax: f64,
}

/// Totals plus the per-line amounts they were summed from (input order).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TotalsBreakdown {
    pub lines: Vec<LineAmount>,
    pub totals: DocumentTotals,
}

/// Compute subtotal, tax and grand total for an ordered list of items.
///
/// An empty list yields all zeros.
pub fn compute_totals(items: &[LineItem]) -> DocumentTotals {
    compute_breakdown(items).totals
}

/// Like [`compute_totals`], also returning each line's amount and tax.
pub fn compute_breakdown(items: &[LineItem]) -> TotalsBreakdown {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = 0.0;
    let mut tax_total = 0.0;

    for item in items {
        let line = LineAmount {
            amount: item.amount(),
            tax: item.tax(),
        };
        subtotal += line.amount;
        tax_total += line.tax;
        lines.push(line);
    }

    TotalsBreakdown {
        lines,
        totals: DocumentTotals {
            subtotal,
            tax_total,
            total: subtotal + tax_total,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_items_total_zero() {
        assert_eq!(compute_totals(&[]), DocumentTotals::default());
    }

    #[test]
    fn two_line_example() {
        let items = vec![
            LineItem::new("Filter", 2.0, 10.0, 10.0),
            LineItem::new("Labour", 1.0, 5.0, 0.0),
        ];

        let totals = compute_totals(&items);
        assert_eq!(totals.subtotal, 25.0);
        assert_eq!(totals.tax_total, 2.0);
        assert_eq!(totals.total, 27.0);
    }

    #[test]
    fn breakdown_preserves_line_order() {
        let items = vec![
            LineItem::new("b", 1.0, 5.0, 0.0),
            LineItem::new("a", 2.0, 10.0, 10.0),
        ];

        let breakdown = compute_breakdown(&items);
        assert_eq!(
            breakdown.lines,
            vec![
                LineAmount { amount: 5.0, tax: 0.0 },
                LineAmount { amount: 20.0, tax: 2.0 },
            ]
        );
        assert_eq!(breakdown.totals.total, 27.0);
    }

    #[test]
    fn coerced_zero_lines_contribute_nothing() {
        let items = vec![
            LineItem::from_form("junk", "abc", "10", "10"),
            LineItem::new("real", 1.0, 4.0, 50.0),
        ];

        let totals = compute_totals(&items);
        assert_eq!(totals.subtotal, 4.0);
        assert_eq!(totals.tax_total, 2.0);
        assert_eq!(totals.total, 6.0);
    }

    fn arb_item() -> impl Strategy<Value = LineItem> {
        (0.0f64..1_000.0, 0.0f64..100_000.0, 0.0f64..100.0)
            .prop_map(|(q, p, t)| LineItem::new("item", q, p, t))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: total is exactly subtotal + tax, and subtotal is the
        /// in-order sum of quantity × price.
        #[test]
        fn total_is_subtotal_plus_tax(items in prop::collection::vec(arb_item(), 0..20)) {
            let totals = compute_totals(&items);

            let mut expected_subtotal = 0.0;
            for item in &items {
                expected_subtotal += item.quantity * item.unit_price;
            }

            prop_assert_eq!(totals.total, totals.subtotal + totals.tax_total);
            prop_assert_eq!(totals.subtotal, expected_subtotal);
        }
    }
}
