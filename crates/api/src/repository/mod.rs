//! Record storage behind the HTTP routes.
//!
//! Records are opaque JSON objects keyed by `(collection, id)`. Listing
//! returns them in the order they were first inserted; an upsert of an
//! existing id replaces the body but keeps its position.

mod memory;
mod sqlite;

use std::sync::Arc;

use serde_json::Value;

pub use memory::InMemoryRecords;
pub use sqlite::SqliteRecords;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Whether an upsert inserted a new record or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError>;

    async fn upsert(&self, collection: &str, id: &str, body: Value) -> Result<Upsert, RepositoryError>;

    /// `false` when no record had that id.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait::async_trait]
impl<R> RecordRepository for Arc<R>
where
    R: RecordRepository + ?Sized,
{
    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError> {
        (**self).list(collection).await
    }

    async fn upsert(&self, collection: &str, id: &str, body: Value) -> Result<Upsert, RepositoryError> {
        (**self).upsert(collection, id, body).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        (**self).delete(collection, id).await
    }
}

#[cfg(test)]
mod contract {
    //! Behaviour every repository must share.

    use super::*;
    use serde_json::json;

    pub async fn upsert_keeps_first_insertion_order(repo: &dyn RecordRepository) {
        assert_eq!(repo.upsert("ledger", "a", json!({"id": "a", "v": 1})).await.unwrap(), Upsert::Created);
        assert_eq!(repo.upsert("ledger", "b", json!({"id": "b"})).await.unwrap(), Upsert::Created);
        assert_eq!(repo.upsert("ledger", "a", json!({"id": "a", "v": 2})).await.unwrap(), Upsert::Updated);
        repo.upsert("clients", "a", json!({"id": "a", "name": "Acme"})).await.unwrap();

        let ledger = repo.list("ledger").await.unwrap();
        assert_eq!(ledger, vec![json!({"id": "a", "v": 2}), json!({"id": "b"})]);
        assert_eq!(repo.list("clients").await.unwrap().len(), 1);
        assert!(repo.list("quotes").await.unwrap().is_empty());
    }

    pub async fn delete_reports_missing_ids(repo: &dyn RecordRepository) {
        repo.upsert("quotes", "q1", json!({"id": "q1"})).await.unwrap();

        assert!(repo.delete("quotes", "q1").await.unwrap());
        assert!(!repo.delete("quotes", "q1").await.unwrap());
        assert!(!repo.delete("invoices", "q1").await.unwrap());
        assert!(repo.list("quotes").await.unwrap().is_empty());
    }
}
