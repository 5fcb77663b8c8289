use std::sync::Arc;

use serde_json::Value;

use nexus_infra::Collection;

use crate::app::errors::ApiError;
use crate::repository::{RecordRepository, Upsert};

/// Shared state handed to every handler.
pub struct AppServices {
    records: Arc<dyn RecordRepository>,
}

impl AppServices {
    pub fn new(records: Arc<dyn RecordRepository>) -> Self {
        Self { records }
    }

    pub async fn list(&self, collection: &str) -> Result<Vec<Value>, ApiError> {
        let collection = known(collection)?;
        Ok(self.records.list(collection.name()).await?)
    }

    /// Store `body` under the string `id` it carries, trimmed.
    pub async fn create(&self, collection: &str, body: Value) -> Result<(Upsert, Value), ApiError> {
        let collection = known(collection)?;
        let Value::Object(mut fields) = body else {
            return Err(ApiError::Validation("record must be a JSON object".to_string()));
        };
        let id = match fields.get("id").and_then(Value::as_str).map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(ApiError::Validation("record must carry a string `id`".to_string())),
        };
        fields.insert("id".to_string(), Value::String(id.clone()));
        let body = Value::Object(fields);

        let outcome = self.records.upsert(collection.name(), &id, body.clone()).await?;
        tracing::info!(collection = %collection, id = %id, ?outcome, "record stored");
        Ok((outcome, body))
    }

    /// Store `body` under the path id, which overrides any `id` in the body.
    pub async fn update(&self, collection: &str, id: &str, body: Value) -> Result<(Upsert, Value), ApiError> {
        let collection = known(collection)?;
        let Value::Object(mut fields) = body else {
            return Err(ApiError::Validation("record must be a JSON object".to_string()));
        };
        fields.insert("id".to_string(), Value::String(id.to_string()));
        let body = Value::Object(fields);

        let outcome = self.records.upsert(collection.name(), id, body.clone()).await?;
        tracing::info!(collection = %collection, id = %id, ?outcome, "record stored");
        Ok((outcome, body))
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let collection = known(collection)?;
        if !self.records.delete(collection.name(), id).await? {
            return Err(ApiError::NotFound(format!("{collection}/{id}")));
        }
        tracing::info!(collection = %collection, id = %id, "record deleted");
        Ok(())
    }
}

fn known(collection: &str) -> Result<Collection, ApiError> {
    Collection::from_name(collection).ok_or_else(|| ApiError::UnknownCollection(collection.to_string()))
}
