//! The `Book`: every user-facing operation over the local store.
//!
//! Each operation loads the collections it touches, changes a local snapshot,
//! and writes each touched collection back whole. Only after the store accepted
//! the write are the affected records reported to the [`ChangeSink`]; what the
//! sink does with them (e.g. mirror them remotely) can never undo or fail a
//! local save.
//!
//! ```text
//! draft ──validate──▶ load ──mutate──▶ save ──▶ ChangeSink
//!                                  │
//!                                  └─ invoices: link_invoice_to_ledger / unlink_invoice
//! ```
//!
//! There is no locking: callers serialise writes to one store.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use nexus_clients::{Client, ClientDraft};
use nexus_core::entity::position_of;
use nexus_core::{Clock, DomainError, Entity, RecordId, SystemClock};
use nexus_documents::{DocumentDraft, DocumentKind, FinancialDocument};
use nexus_ledger::{
    DashboardSummary, EntryDraft, EntryKind, LedgerEntry, LinkOutcome, link_invoice_to_ledger,
    unlink_invoice,
};

use crate::change::{Change, ChangeSink, DiscardChanges};
use crate::collections::{self, Collection, SETTINGS_KEY};
use crate::settings::Settings;
use crate::store::{LocalStore, StoreError};

#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BookError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BookError::Domain(DomainError::Validation(_)))
    }
}

pub type BookResult<T> = Result<T, BookError>;

/// A saved invoice together with its ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedInvoice {
    pub invoice: FinancialDocument,
    pub link: LinkOutcome,
}

pub struct Book<S> {
    store: S,
    sink: Arc<dyn ChangeSink>,
    clock: Arc<dyn Clock>,
}

impl<S> std::fmt::Debug for Book<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book").finish_non_exhaustive()
    }
}

impl<S: LocalStore> Book<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            sink: Arc::new(DiscardChanges),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- ledger ----

    /// All entries in stored order.
    pub fn entries(&self) -> BookResult<Vec<LedgerEntry>> {
        self.load(Collection::Ledger)
    }

    pub fn entries_of_kind(&self, kind: EntryKind) -> BookResult<Vec<LedgerEntry>> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.kind() == kind);
        Ok(entries)
    }

    /// Entries for display, newest first; `None` lists both kinds.
    pub fn recent_entries(&self, kind: Option<EntryKind>) -> BookResult<Vec<LedgerEntry>> {
        let mut entries = match kind {
            Some(kind) => self.entries_of_kind(kind)?,
            None => self.entries()?,
        };
        entries.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(entries)
    }

    pub fn entry(&self, id: &RecordId) -> BookResult<LedgerEntry> {
        let entries = self.entries()?;
        find(entries, id, "ledger entry")
    }

    pub fn create_entry(&self, draft: EntryDraft) -> BookResult<LedgerEntry> {
        draft.validate()?;
        let mut entries = self.entries()?;
        let entry = LedgerEntry::record(RecordId::generate(), draft, self.clock.now());
        entries.push(entry.clone());
        self.save(Collection::Ledger, &entries)?;

        tracing::info!(id = %entry.id(), kind = entry.kind().label(), amount = entry.amount(), "ledger entry created");
        self.emit_upsert(Collection::Ledger, &entry, true);
        Ok(entry)
    }

    pub fn update_entry(&self, id: &RecordId, draft: EntryDraft) -> BookResult<LedgerEntry> {
        draft.validate()?;
        let mut entries = self.entries()?;
        let idx = position_of(&entries, id).ok_or_else(|| not_found("ledger entry", id))?;
        let entry = entries[idx].updated(draft, self.clock.today());
        entries[idx] = entry.clone();
        self.save(Collection::Ledger, &entries)?;

        tracing::info!(id = %id, "ledger entry updated");
        self.emit_upsert(Collection::Ledger, &entry, false);
        Ok(entry)
    }

    pub fn delete_entry(&self, id: &RecordId) -> BookResult<LedgerEntry> {
        let mut entries = self.entries()?;
        let idx = position_of(&entries, id).ok_or_else(|| not_found("ledger entry", id))?;
        let removed = entries.remove(idx);
        self.save(Collection::Ledger, &entries)?;

        tracing::info!(id = %id, "ledger entry deleted");
        self.emit_delete(Collection::Ledger, id.clone());
        Ok(removed)
    }

    pub fn dashboard(&self) -> BookResult<DashboardSummary> {
        let entries = self.entries()?;
        Ok(DashboardSummary::compute(&entries, self.clock.today()))
    }

    // ---- invoices & quotes ----

    /// Documents of `kind`, newest first.
    pub fn documents(&self, kind: DocumentKind) -> BookResult<Vec<FinancialDocument>> {
        let mut docs: Vec<FinancialDocument> = self.load(Collection::for_documents(kind))?;
        docs.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(docs)
    }

    pub fn invoices(&self) -> BookResult<Vec<FinancialDocument>> {
        self.documents(DocumentKind::Invoice)
    }

    pub fn quotes(&self) -> BookResult<Vec<FinancialDocument>> {
        self.documents(DocumentKind::Quote)
    }

    pub fn document(&self, kind: DocumentKind, id: &RecordId) -> BookResult<FinancialDocument> {
        let docs: Vec<FinancialDocument> = self.load(Collection::for_documents(kind))?;
        find(docs, id, kind.label())
    }

    /// Save a new invoice and its income entry.
    pub fn create_invoice(&self, draft: DocumentDraft) -> BookResult<SavedInvoice> {
        draft.validate(DocumentKind::Invoice)?;
        let mut invoices: Vec<FinancialDocument> = self.load(Collection::Invoices)?;
        let mut entries = self.entries()?;

        let invoice = FinancialDocument::issue(DocumentKind::Invoice, RecordId::generate(), draft, self.clock.now());
        invoices.push(invoice.clone());
        let link = link_to_ledger(&invoice, &mut entries)?;
        self.save_invoices_and_ledger(&invoices, &entries)?;

        tracing::info!(id = %invoice.id(), number = invoice.number(), total = invoice.total(), "invoice created");
        self.emit_upsert(Collection::Invoices, &invoice, true);
        self.emit_link(&invoice, &link);
        Ok(SavedInvoice { invoice, link })
    }

    /// Re-save an invoice; its income entry follows the new total.
    pub fn update_invoice(&self, id: &RecordId, draft: DocumentDraft) -> BookResult<SavedInvoice> {
        draft.validate(DocumentKind::Invoice)?;
        let mut invoices: Vec<FinancialDocument> = self.load(Collection::Invoices)?;
        let idx = position_of_kind(&invoices, DocumentKind::Invoice, id)?;
        let mut entries = self.entries()?;

        let invoice = invoices[idx].revise(draft, self.clock.today());
        invoices[idx] = invoice.clone();
        let link = link_to_ledger(&invoice, &mut entries)?;
        self.save_invoices_and_ledger(&invoices, &entries)?;

        tracing::info!(id = %id, number = invoice.number(), total = invoice.total(), "invoice updated");
        self.emit_upsert(Collection::Invoices, &invoice, false);
        self.emit_link(&invoice, &link);
        Ok(SavedInvoice { invoice, link })
    }

    /// Delete an invoice and the ledger entry derived from it.
    pub fn delete_invoice(&self, id: &RecordId) -> BookResult<FinancialDocument> {
        let mut invoices: Vec<FinancialDocument> = self.load(Collection::Invoices)?;
        let idx = position_of(&invoices, id).ok_or_else(|| not_found(DocumentKind::Invoice.label(), id))?;
        let mut entries = self.entries()?;

        let removed = invoices.remove(idx);
        let unlinked = unlink_invoice(id, &mut entries);
        if unlinked.is_empty() {
            self.save(Collection::Invoices, &invoices)?;
        } else {
            self.save_invoices_and_ledger(&invoices, &entries)?;
        }

        tracing::info!(id = %id, "invoice deleted");
        self.emit_delete(Collection::Invoices, id.clone());
        for entry in &unlinked {
            tracing::info!(id = %entry.id(), invoice = %id, "invoice ledger entry removed");
            self.emit_delete(Collection::Ledger, entry.id().clone());
        }
        Ok(removed)
    }

    pub fn create_quote(&self, draft: DocumentDraft) -> BookResult<FinancialDocument> {
        self.create_document(DocumentKind::Quote, draft)
    }

    pub fn update_quote(&self, id: &RecordId, draft: DocumentDraft) -> BookResult<FinancialDocument> {
        self.update_document(DocumentKind::Quote, id, draft)
    }

    pub fn delete_quote(&self, id: &RecordId) -> BookResult<FinancialDocument> {
        self.delete_document(DocumentKind::Quote, id)
    }

    fn create_document(&self, kind: DocumentKind, draft: DocumentDraft) -> BookResult<FinancialDocument> {
        draft.validate(kind)?;
        let collection = Collection::for_documents(kind);
        let mut docs: Vec<FinancialDocument> = self.load(collection)?;
        let doc = FinancialDocument::issue(kind, RecordId::generate(), draft, self.clock.now());
        docs.push(doc.clone());
        self.save(collection, &docs)?;

        tracing::info!(id = %doc.id(), number = doc.number(), total = doc.total(), "{} created", kind.label());
        self.emit_upsert(collection, &doc, true);
        Ok(doc)
    }

    fn update_document(
        &self,
        kind: DocumentKind,
        id: &RecordId,
        draft: DocumentDraft,
    ) -> BookResult<FinancialDocument> {
        draft.validate(kind)?;
        let collection = Collection::for_documents(kind);
        let mut docs: Vec<FinancialDocument> = self.load(collection)?;
        let idx = position_of_kind(&docs, kind, id)?;
        let doc = docs[idx].revise(draft, self.clock.today());
        docs[idx] = doc.clone();
        self.save(collection, &docs)?;

        tracing::info!(id = %id, number = doc.number(), total = doc.total(), "{} updated", kind.label());
        self.emit_upsert(collection, &doc, false);
        Ok(doc)
    }

    fn delete_document(&self, kind: DocumentKind, id: &RecordId) -> BookResult<FinancialDocument> {
        let collection = Collection::for_documents(kind);
        let mut docs: Vec<FinancialDocument> = self.load(collection)?;
        let idx = position_of(&docs, id).ok_or_else(|| not_found(kind.label(), id))?;
        let removed = docs.remove(idx);
        self.save(collection, &docs)?;

        tracing::info!(id = %id, "{} deleted", kind.label());
        self.emit_delete(collection, id.clone());
        Ok(removed)
    }

    /// Write the ledger, then the invoices.
    ///
    /// If the invoice write fails the previous ledger blob is put back, so the
    /// two collections never disagree about which invoices exist.
    fn save_invoices_and_ledger(&self, invoices: &[FinancialDocument], entries: &[LedgerEntry]) -> BookResult<()> {
        let ledger_key = Collection::Ledger.storage_key();
        let previous = self.store.get(ledger_key)?;
        self.save(Collection::Ledger, entries)?;

        if let Err(err) = self.save(Collection::Invoices, invoices) {
            let restore = previous.as_deref().unwrap_or("[]");
            if let Err(e) = self.store.put(ledger_key, restore) {
                tracing::error!(key = ledger_key, error = %e, "failed to restore ledger after invoice write failed");
            }
            return Err(err);
        }
        Ok(())
    }

    fn emit_link(&self, invoice: &FinancialDocument, link: &LinkOutcome) {
        tracing::debug!(
            entry = %link.entry().id(),
            invoice = %invoice.id(),
            created = link.is_created(),
            "invoice linked to ledger"
        );
        self.emit_upsert(Collection::Ledger, link.entry(), link.is_created());
    }

    // ---- clients ----

    pub fn clients(&self) -> BookResult<Vec<Client>> {
        self.load(Collection::Clients)
    }

    pub fn client(&self, id: &RecordId) -> BookResult<Client> {
        find(self.clients()?, id, "client")
    }

    pub fn create_client(&self, draft: ClientDraft) -> BookResult<Client> {
        draft.validate()?;
        let mut clients = self.clients()?;
        let client = Client::register(RecordId::generate(), draft, self.clock.now());
        clients.push(client.clone());
        self.save(Collection::Clients, &clients)?;

        tracing::info!(id = %client.id(), name = client.name(), "client created");
        self.emit_upsert(Collection::Clients, &client, true);
        Ok(client)
    }

    pub fn update_client(&self, id: &RecordId, draft: ClientDraft) -> BookResult<Client> {
        draft.validate()?;
        let mut clients = self.clients()?;
        let idx = position_of(&clients, id).ok_or_else(|| not_found("client", id))?;
        let client = clients[idx].updated(draft);
        clients[idx] = client.clone();
        self.save(Collection::Clients, &clients)?;

        tracing::info!(id = %id, "client updated");
        self.emit_upsert(Collection::Clients, &client, false);
        Ok(client)
    }

    /// Documents that copied this client's details keep them.
    pub fn delete_client(&self, id: &RecordId) -> BookResult<Client> {
        let mut clients = self.clients()?;
        let idx = position_of(&clients, id).ok_or_else(|| not_found("client", id))?;
        let removed = clients.remove(idx);
        self.save(Collection::Clients, &clients)?;

        tracing::info!(id = %id, "client deleted");
        self.emit_delete(Collection::Clients, id.clone());
        Ok(removed)
    }

    // ---- settings ----

    /// Stored settings; defaults when none were saved or the blob is unreadable.
    pub fn settings(&self) -> BookResult<Settings> {
        let Some(blob) = self.store.get(SETTINGS_KEY)? else {
            return Ok(Settings::default());
        };
        match serde_json::from_str(&blob) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(key = SETTINGS_KEY, error = %e, "ignoring unreadable settings blob");
                Ok(Settings::default())
            }
        }
    }

    /// Settings stay local; they are not mirrored.
    pub fn update_settings(&self, settings: Settings) -> BookResult<Settings> {
        let settings = Settings {
            currency_symbol: settings.currency().symbol,
            ..settings
        };
        let blob = serde_json::to_string(&settings).map_err(|source| StoreError::Encode {
            key: SETTINGS_KEY.to_string(),
            source,
        })?;
        self.store.put(SETTINGS_KEY, &blob)?;
        tracing::info!("settings saved");
        Ok(settings)
    }

    // ---- hydration ----

    /// Replace a whole collection with records fetched from elsewhere.
    ///
    /// Every record must parse as the collection's record type (documents
    /// must also be of the collection's kind), otherwise nothing is written.
    /// Nothing is reported to the sink.
    pub fn replace_collection(&self, collection: Collection, records: Vec<Value>) -> BookResult<usize> {
        match collection {
            Collection::Ledger => self.replace_typed::<LedgerEntry, _>(collection, records, |_| Ok(())),
            Collection::Invoices | Collection::Quotes => {
                self.replace_typed::<FinancialDocument, _>(collection, records, |doc| {
                    if Collection::for_documents(doc.kind()) == collection {
                        Ok(())
                    } else {
                        Err(format!("{} {} does not belong in {collection}", doc.kind().label(), doc.id()))
                    }
                })
            }
            Collection::Clients => self.replace_typed::<Client, _>(collection, records, |_| Ok(())),
        }
    }

    fn replace_typed<T, F>(&self, collection: Collection, records: Vec<Value>, belongs: F) -> BookResult<usize>
    where
        T: DeserializeOwned + Serialize,
        F: Fn(&T) -> Result<(), String>,
    {
        let malformed = |i: usize, message: String| StoreError::Malformed {
            key: collection.storage_key().to_string(),
            message: format!("record {i}: {message}"),
        };
        let typed = records
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let record = serde_json::from_value::<T>(value).map_err(|e| malformed(i, e.to_string()))?;
                belongs(&record).map_err(|message| malformed(i, message))?;
                Ok::<T, StoreError>(record)
            })
            .collect::<Result<Vec<T>, StoreError>>()?;

        self.save(collection, &typed)?;
        tracing::info!(collection = %collection, count = typed.len(), "collection replaced");
        Ok(typed.len())
    }

    // ---- plumbing ----

    fn load<T: DeserializeOwned>(&self, collection: Collection) -> BookResult<Vec<T>> {
        Ok(collections::load(&self.store, collection)?)
    }

    fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> BookResult<()> {
        Ok(collections::save(&self.store, collection, records)?)
    }

    fn emit_upsert<T>(&self, collection: Collection, record: &T, created: bool)
    where
        T: Serialize + Entity<Id = RecordId>,
    {
        let id = record.id().clone();
        let record = match serde_json::to_value(record) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(collection = %collection, id = %id, error = %e, "change not reported");
                return;
            }
        };
        let change = if created {
            Change::Created { collection, id, record }
        } else {
            Change::Updated { collection, id, record }
        };
        tracing::debug!(collection = %collection, id = %change.id(), verb = change.verb(), "change recorded");
        self.sink.record(change);
    }

    fn emit_delete(&self, collection: Collection, id: RecordId) {
        tracing::debug!(collection = %collection, id = %id, verb = "delete", "change recorded");
        self.sink.record(Change::Deleted { collection, id });
    }
}

fn not_found(what: &str, id: &RecordId) -> BookError {
    DomainError::not_found(format!("{what} {id} not found")).into()
}

/// Index of `id`, which must hold a document of `kind`.
fn position_of_kind(docs: &[FinancialDocument], kind: DocumentKind, id: &RecordId) -> BookResult<usize> {
    let idx = position_of(docs, id).ok_or_else(|| not_found(kind.label(), id))?;
    let stored = docs[idx].kind();
    if stored != kind {
        return Err(DomainError::validation(format!(
            "{id}: stored kind {} does not match {}",
            stored.label(),
            kind.label()
        ))
        .into());
    }
    Ok(idx)
}

fn link_to_ledger(invoice: &FinancialDocument, entries: &mut Vec<LedgerEntry>) -> BookResult<LinkOutcome> {
    link_invoice_to_ledger(invoice, entries)
        .ok_or_else(|| DomainError::validation("only invoices are linked to the ledger").into())
}

fn find<T>(records: Vec<T>, id: &RecordId, what: &str) -> BookResult<T>
where
    T: Entity<Id = RecordId>,
{
    records
        .into_iter()
        .find(|r| r.id() == id)
        .ok_or_else(|| not_found(what, id))
}
