use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::{RecordRepository, RepositoryError, Upsert};

/// In-memory repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecords {
    inner: RwLock<HashMap<String, Vec<(String, Value)>>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("in-memory records lock poisoned".to_string())
}

#[async_trait::async_trait]
impl RecordRepository for InMemoryRecords {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .get(collection)
            .map(|records| records.iter().map(|(_, body)| body.clone()).collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, collection: &str, id: &str, body: Value) -> Result<Upsert, RepositoryError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let records = map.entry(collection.to_string()).or_default();
        match records.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, stored)) => {
                *stored = body;
                Ok(Upsert::Updated)
            }
            None => {
                records.push((id.to_string(), body));
                Ok(Upsert::Created)
            }
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let Some(records) = map.get_mut(collection) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|(existing, _)| existing != id);
        Ok(records.len() != before)
    }
}
