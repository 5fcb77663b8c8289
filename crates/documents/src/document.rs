use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::error::require_non_blank;
use nexus_core::{DomainResult, Entity, RecordId};

use crate::line_item::LineItem;
use crate::totals::{DocumentTotals, compute_totals};

/// Invoices and quotes share one shape and differ only by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Quote,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Quote => "Quote",
        }
    }
}

/// Client details copied into a document when it is saved.
///
/// Later edits to the client do not reach documents already saved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSnapshot {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// User-editable part of a document, as submitted from a form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDraft {
    pub number: String,
    /// Defaults to the save date when absent.
    pub date: Option<NaiveDate>,
    pub client_id: Option<RecordId>,
    pub client: ClientSnapshot,
    pub payment_method: String,
    pub notes: String,
    pub items: Vec<LineItem>,
}

impl DocumentDraft {
    /// Number and client name are required.
    pub fn validate(&self, kind: DocumentKind) -> DomainResult<()> {
        require_non_blank(&format!("{} number", kind.label().to_lowercase()), &self.number)?;
        require_non_blank("client name", &self.client.name)?;
        Ok(())
    }
}

/// A saved invoice or quote.
///
/// Totals are always derived from `items`; they are recomputed when a stored
/// document is deserialized, so a stale or edited total in storage never
/// survives a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentRecord")]
pub struct FinancialDocument {
    id: RecordId,
    kind: DocumentKind,
    number: String,
    date: NaiveDate,
    client_id: Option<RecordId>,
    client: ClientSnapshot,
    payment_method: String,
    notes: String,
    items: Vec<LineItem>,
    #[serde(flatten)]
    totals: DocumentTotals,
    created_at: DateTime<Utc>,
}

impl FinancialDocument {
    /// Build a new document from a draft. Validation is the caller's job.
    pub fn issue(kind: DocumentKind, id: RecordId, draft: DocumentDraft, created_at: DateTime<Utc>) -> Self {
        let date = draft.date.unwrap_or_else(|| created_at.date_naive());
        Self::assemble(kind, id, date, draft, created_at)
    }

    /// Replace every editable field with the draft's. Id, kind and creation
    /// time are kept.
    pub fn revise(&self, draft: DocumentDraft, today: NaiveDate) -> Self {
        let date = draft.date.unwrap_or(today);
        Self::assemble(self.kind, self.id.clone(), date, draft, self.created_at)
    }

    fn assemble(
        kind: DocumentKind,
        id: RecordId,
        date: NaiveDate,
        draft: DocumentDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        let totals = compute_totals(&draft.items);
        Self {
            id,
            kind,
            number: draft.number.trim().to_string(),
            date,
            client_id: draft.client_id,
            client: ClientSnapshot {
                name: draft.client.name.trim().to_string(),
                address: draft.client.address.trim().to_string(),
                email: draft.client.email.trim().to_string(),
                phone: draft.client.phone.trim().to_string(),
            },
            payment_method: draft.payment_method,
            notes: draft.notes.trim().to_string(),
            items: draft.items,
            totals,
            created_at,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn client_id(&self) -> Option<&RecordId> {
        self.client_id.as_ref()
    }

    pub fn client(&self) -> &ClientSnapshot {
        &self.client
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> DocumentTotals {
        self.totals
    }

    pub fn subtotal(&self) -> f64 {
        self.totals.subtotal
    }

    pub fn tax_total(&self) -> f64 {
        self.totals.tax_total
    }

    pub fn total(&self) -> f64 {
        self.totals.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Draft holding this document's current values (for editing).
    pub fn to_draft(&self) -> DocumentDraft {
        DocumentDraft {
            number: self.number.clone(),
            date: Some(self.date),
            client_id: self.client_id.clone(),
            client: self.client.clone(),
            payment_method: self.payment_method.clone(),
            notes: self.notes.clone(),
            items: self.items.clone(),
        }
    }
}

impl Entity for FinancialDocument {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Stored shape. Any persisted totals are ignored.
#[derive(Deserialize)]
struct DocumentRecord {
    id: RecordId,
    kind: DocumentKind,
    number: String,
    date: NaiveDate,
    #[serde(default)]
    client_id: Option<RecordId>,
    #[serde(default)]
    client: ClientSnapshot,
    #[serde(default)]
    payment_method: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    items: Vec<LineItem>,
    created_at: DateTime<Utc>,
}

impl From<DocumentRecord> for FinancialDocument {
    fn from(r: DocumentRecord) -> Self {
        let totals = compute_totals(&r.items);
        Self {
            id: r.id,
            kind: r.kind,
            number: r.number,
            date: r.date,
            client_id: r.client_id,
            client: r.client,
            payment_method: r.payment_method,
            notes: r.notes,
            items: r.items,
            totals,
            created_at: r.created_at,
        }
    }
}
