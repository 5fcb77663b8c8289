//! Income/expense ledger.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod dashboard;
pub mod entry;
pub mod linkage;

pub use dashboard::DashboardSummary;
pub use entry::{EntryDraft, EntryKind, LedgerEntry};
pub use linkage::{
    INVOICE_CATEGORY, LEDGER_ID_PREFIX, LinkOutcome, invoice_entry_id, link_invoice_to_ledger,
    unlink_invoice,
};
