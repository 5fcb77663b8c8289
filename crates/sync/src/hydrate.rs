//! Startup pull of remote state into the local store.

use serde_json::Value;

use nexus_infra::{Book, Collection, LocalStore};

use crate::remote::RemoteApi;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HydrateReport {
    /// Collections replaced from the remote, with their record counts.
    pub replaced: Vec<(Collection, usize)>,
    /// Collections left untouched (unreachable remote, wrong shape, bad records).
    pub skipped: Vec<Collection>,
}

/// Fetch every collection and replace the local copy with it.
///
/// A collection is replaced only when the remote answers with a JSON array
/// whose every element parses as that collection's record type. Anything else
/// leaves the local collection as it was. Never fails.
pub async fn hydrate<S, R>(book: &Book<S>, remote: &R) -> HydrateReport
where
    S: LocalStore,
    R: RemoteApi + ?Sized,
{
    let mut report = HydrateReport::default();

    for collection in Collection::ALL {
        let records = match remote.list(collection).await {
            Ok(Value::Array(records)) => records,
            Ok(other) => {
                tracing::warn!(collection = %collection, body = kind_of(&other), "remote returned a non-array, keeping local data");
                report.skipped.push(collection);
                continue;
            }
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "remote fetch failed, keeping local data");
                report.skipped.push(collection);
                continue;
            }
        };

        match book.replace_collection(collection, records) {
            Ok(count) => report.replaced.push((collection, count)),
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "remote records rejected, keeping local data");
                report.skipped.push(collection);
            }
        }
    }

    tracing::info!(
        replaced = report.replaced.len(),
        skipped = report.skipped.len(),
        "hydration finished"
    );
    report
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use nexus_core::RecordId;
    use nexus_infra::InMemoryStore;
    use nexus_ledger::{EntryDraft, EntryKind};
    use serde_json::json;

    use crate::remote::SyncError;

    /// Serves canned `list` bodies; a missing collection is a network error.
    struct Canned(HashMap<Collection, Value>);

    #[async_trait::async_trait]
    impl RemoteApi for Canned {
        async fn list(&self, collection: Collection) -> Result<Value, SyncError> {
            self.0
                .get(&collection)
                .cloned()
                .ok_or_else(|| SyncError::Network("connection refused".to_string()))
        }

        async fn create(&self, _: Collection, _: &Value) -> Result<(), SyncError> {
            unreachable!("hydration never writes")
        }

        async fn update(&self, _: Collection, _: &RecordId, _: &Value) -> Result<(), SyncError> {
            unreachable!("hydration never writes")
        }

        async fn delete(&self, _: Collection, _: &RecordId) -> Result<(), SyncError> {
            unreachable!("hydration never writes")
        }
    }

    fn book_with_one_entry() -> Book<Arc<InMemoryStore>> {
        let book = Book::new(Arc::new(InMemoryStore::new()));
        book.create_entry(EntryDraft {
            kind: EntryKind::Expense,
            date: None,
            description: "Rent".to_string(),
            category: "Office".to_string(),
            payment_method: "Transfer".to_string(),
            amount: 500.0,
        })
        .unwrap();
        book
    }

    #[tokio::test]
    async fn non_array_and_failed_fetches_keep_local_data() {
        let book = book_with_one_entry();
        let remote = Canned(HashMap::from([
            (Collection::Ledger, json!({"error": "maintenance"})),
            (Collection::Clients, json!([{"id": "c1", "name": "Acme", "created_at": "2024-01-01T00:00:00Z"}])),
        ]));

        let report = hydrate(&book, &remote).await;

        assert_eq!(report.replaced, vec![(Collection::Clients, 1)]);
        assert_eq!(
            report.skipped,
            vec![Collection::Ledger, Collection::Invoices, Collection::Quotes]
        );
        assert_eq!(book.entries().unwrap().len(), 1);
        assert_eq!(book.clients().unwrap()[0].name(), "Acme");
    }

    #[tokio::test]
    async fn arrays_with_bad_records_are_rejected_whole() {
        let book = book_with_one_entry();
        let remote = Canned(HashMap::from([(
            Collection::Ledger,
            json!([{"id": "r1", "kind": "income", "date": "2024-03-01", "amount": 5, "created_at": "2024-03-01T00:00:00Z"}, 17]),
        )]));

        let report = hydrate(&book, &remote).await;

        assert!(report.replaced.is_empty());
        assert_eq!(book.entries().unwrap()[0].description(), "Rent");
    }

    #[tokio::test]
    async fn empty_arrays_replace_local_data() {
        let book = book_with_one_entry();
        let remote = Canned(HashMap::from([(Collection::Ledger, json!([]))]));

        let report = hydrate(&book, &remote).await;

        assert_eq!(report.replaced, vec![(Collection::Ledger, 0)]);
        assert!(book.entries().unwrap().is_empty());
    }
}
