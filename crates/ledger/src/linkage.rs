//! Invoice → ledger linkage.
//!
//! Every saved invoice has exactly one income entry mirroring its total. The
//! entry id is derived from the invoice id (`inv-entry-{invoice_id}`), so
//! re-deriving after a re-save lands on the same entry instead of adding a
//! second one. Quotes never touch the ledger.

use nexus_core::{Entity, RecordId};
use nexus_documents::{DocumentKind, FinancialDocument};

use crate::entry::{EntryKind, LedgerEntry};

/// Prefix of ledger entry ids derived from invoices.
pub const LEDGER_ID_PREFIX: &str = "inv-entry-";

/// Category given to every invoice-derived entry.
pub const INVOICE_CATEGORY: &str = "Invoice";

/// Result of linking an invoice: the entry was either added or refreshed.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    Created(LedgerEntry),
    Updated(LedgerEntry),
}

impl LinkOutcome {
    pub fn entry(&self) -> &LedgerEntry {
        match self {
            LinkOutcome::Created(e) | LinkOutcome::Updated(e) => e,
        }
    }

    pub fn into_entry(self) -> LedgerEntry {
        match self {
            LinkOutcome::Created(e) | LinkOutcome::Updated(e) => e,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, LinkOutcome::Created(_))
    }
}

/// Id of the ledger entry derived from `invoice_id`.
pub fn invoice_entry_id(invoice_id: &RecordId) -> RecordId {
    RecordId::derived(LEDGER_ID_PREFIX, invoice_id)
}

fn describe(invoice: &FinancialDocument) -> String {
    format!("Invoice {} — {}", invoice.number(), invoice.client().name)
}

/// Create or refresh the income entry for `invoice` inside `entries`.
///
/// The existing entry is found by `source_document_id`; an entry that already
/// carries the derived id is adopted as well. On update the date, description,
/// category, payment method and amount are overwritten and `created_at` is
/// left alone. A new entry takes the invoice's `created_at`.
///
/// Returns `None` for quotes. The caller persists `entries`.
pub fn link_invoice_to_ledger(
    invoice: &FinancialDocument,
    entries: &mut Vec<LedgerEntry>,
) -> Option<LinkOutcome> {
    if invoice.kind() != DocumentKind::Invoice {
        return None;
    }

    let source = invoice.id().clone();
    let derived_id = invoice_entry_id(&source);

    let existing = entries
        .iter()
        .position(|e| e.source_document_id.as_ref() == Some(&source))
        .or_else(|| entries.iter().position(|e| e.id == derived_id));

    match existing {
        Some(idx) => {
            let entry = &mut entries[idx];
            entry.date = invoice.date();
            entry.description = describe(invoice);
            entry.category = INVOICE_CATEGORY.to_string();
            entry.payment_method = invoice.payment_method().to_string();
            entry.amount = invoice.total();
            entry.source_document_id = Some(source);
            Some(LinkOutcome::Updated(entry.clone()))
        }
        None => {
            let entry = LedgerEntry {
                id: derived_id,
                kind: EntryKind::Income,
                date: invoice.date(),
                description: describe(invoice),
                category: INVOICE_CATEGORY.to_string(),
                payment_method: invoice.payment_method().to_string(),
                amount: invoice.total(),
                created_at: invoice.created_at(),
                source_document_id: Some(source),
            };
            entries.push(entry.clone());
            Some(LinkOutcome::Created(entry))
        }
    }
}

/// Remove every entry derived from `invoice_id`, returning what was removed.
///
/// Entries from other invoices and manual entries are untouched.
pub fn unlink_invoice(invoice_id: &RecordId, entries: &mut Vec<LedgerEntry>) -> Vec<LedgerEntry> {
    let mut removed = Vec::new();
    entries.retain(|e| {
        if e.source_document_id.as_ref() == Some(invoice_id) {
            removed.push(e.clone());
            false
        } else {
            true
        }
    });
    removed
}
