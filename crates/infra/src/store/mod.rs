//! Local key/value store of JSON blobs.
//!
//! This is the authoritative copy of the user's data. Each key holds one blob
//! and every write replaces the whole blob; there are no partial writes and no
//! transactions. Callers serialise writes (single writer).

mod memory;
mod sqlite;

use std::sync::Arc;

use thiserror::Error;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed for key {key}: {source}")]
    Database {
        key: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to encode records for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed records for {key}: {message}")]
    Malformed { key: String, message: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value persistence of JSON blobs.
pub trait LocalStore: Send + Sync {
    /// Raw blob stored under `key`, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob stored under `key`.
    fn put(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

impl<S> LocalStore for Arc<S>
where
    S: LocalStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        (**self).put(key, blob)
    }
}
