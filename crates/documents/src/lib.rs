//! Financial documents: invoices and quotes.
//!
//! Line items, the totals engine, and the document record itself. Pure domain
//! logic only: no IO, no storage, no rendering.

pub mod document;
pub mod line_item;
pub mod totals;

pub use document::{ClientSnapshot, DocumentDraft, DocumentKind, FinancialDocument};
pub use line_item::LineItem;
pub use totals::{DocumentTotals, LineAmount, TotalsBreakdown, compute_breakdown, compute_totals};
