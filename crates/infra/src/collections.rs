//! Typed view over the local store: one JSON array per collection.

use serde::Serialize;
use serde::de::DeserializeOwned;

use nexus_documents::DocumentKind;

use crate::store::{LocalStore, StoreError};

/// Storage key of the business settings object.
pub const SETTINGS_KEY: &str = "nexus-finance-config";

/// The record collections kept in the store and mirrored remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Ledger,
    Invoices,
    Quotes,
    Clients,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Ledger,
        Collection::Invoices,
        Collection::Quotes,
        Collection::Clients,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Ledger => "ledger",
            Collection::Invoices => "invoices",
            Collection::Quotes => "quotes",
            Collection::Clients => "clients",
        }
    }

    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Ledger => "nexus-finance-ledger",
            Collection::Invoices => "nexus-finance-invoices",
            Collection::Quotes => "nexus-finance-quotes",
            Collection::Clients => "nexus-finance-clients",
        }
    }

    /// Remote path, e.g. `/ledger`.
    pub fn path(&self) -> String {
        format!("/{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn for_documents(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Invoice => Collection::Invoices,
            DocumentKind::Quote => Collection::Quotes,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Load every record of `collection`.
///
/// A missing blob is an empty collection. So is a blob that does not parse as
/// an array of `T`; that case is logged and the blob is left as it is until
/// the next save overwrites it.
pub fn load<T, S>(store: &S, collection: Collection) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: LocalStore + ?Sized,
{
    let key = collection.storage_key();
    let Some(blob) = store.get(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<T>>(&blob) {
        Ok(records) => Ok(records),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable collection blob");
            Ok(Vec::new())
        }
    }
}

/// Overwrite `collection` with `records`.
pub fn save<T, S>(store: &S, collection: Collection, records: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
    S: LocalStore + ?Sized,
{
    let key = collection.storage_key();
    let blob = serde_json::to_string(records).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.put(key, &blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn keys_and_paths_are_stable() {
        assert_eq!(Collection::Ledger.storage_key(), "nexus-finance-ledger");
        assert_eq!(Collection::Quotes.path(), "/quotes");
        assert_eq!(Collection::from_name("clients"), Some(Collection::Clients));
        assert_eq!(Collection::from_name("users"), None);
        assert_eq!(Collection::for_documents(DocumentKind::Invoice), Collection::Invoices);
    }

    #[test]
    fn missing_and_corrupt_blobs_load_empty() {
        let store = InMemoryStore::new();
        let empty: Vec<serde_json::Value> = load(&store, Collection::Ledger).unwrap();
        assert!(empty.is_empty());

        store.put(Collection::Ledger.storage_key(), "{not json").unwrap();
        let corrupt: Vec<serde_json::Value> = load(&store, Collection::Ledger).unwrap();
        assert!(corrupt.is_empty());

        store.put(Collection::Ledger.storage_key(), r#"{"id":"x"}"#).unwrap();
        let not_array: Vec<serde_json::Value> = load(&store, Collection::Ledger).unwrap();
        assert!(not_array.is_empty());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let store = InMemoryStore::new();
        save(&store, Collection::Clients, &["b", "a", "c"]).unwrap();
        let back: Vec<String> = load(&store, Collection::Clients).unwrap();
        assert_eq!(back, vec!["b", "a", "c"]);
    }
}
