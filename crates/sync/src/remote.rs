//! REST client for the remote mirror.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use nexus_core::RecordId;
use nexus_infra::{Change, Collection};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid API url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Per-collection CRUD against the remote store.
#[async_trait::async_trait]
pub trait RemoteApi: Send + Sync {
    /// Raw body of `GET /{collection}`; the caller decides whether it is usable.
    async fn list(&self, collection: Collection) -> Result<Value, SyncError>;

    async fn create(&self, collection: Collection, record: &Value) -> Result<(), SyncError>;

    async fn update(&self, collection: Collection, id: &RecordId, record: &Value) -> Result<(), SyncError>;

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), SyncError>;
}

#[async_trait::async_trait]
impl<R> RemoteApi for Arc<R>
where
    R: RemoteApi + ?Sized,
{
    async fn list(&self, collection: Collection) -> Result<Value, SyncError> {
        (**self).list(collection).await
    }

    async fn create(&self, collection: Collection, record: &Value) -> Result<(), SyncError> {
        (**self).create(collection, record).await
    }

    async fn update(&self, collection: Collection, id: &RecordId, record: &Value) -> Result<(), SyncError> {
        (**self).update(collection, id, record).await
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), SyncError> {
        (**self).delete(collection, id).await
    }
}

/// Send one local change to the remote.
pub async fn push<R>(remote: &R, change: &Change) -> Result<(), SyncError>
where
    R: RemoteApi + ?Sized,
{
    match change {
        Change::Created { collection, record, .. } => remote.create(*collection, record).await,
        Change::Updated { collection, id, record } => remote.update(*collection, id, record).await,
        Change::Deleted { collection, id } => remote.delete(*collection, id).await,
    }
}

/// [`RemoteApi`] over HTTP (`reqwest`).
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url).map_err(|e| SyncError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        match self.url(&["health"]) {
            Ok(url) => self
                .client
                .get(url)
                .send()
                .await
                .is_ok_and(|r| r.status().is_success()),
            Err(_) => false,
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, SyncError> {
        let resp = req.send().await.map_err(|e| SyncError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(SyncError::Api(status, resp.text().await.unwrap_or_default()));
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl RemoteApi for HttpRemote {
    async fn list(&self, collection: Collection) -> Result<Value, SyncError> {
        let url = self.url(&[collection.name()])?;
        let resp = self.send(self.client.get(url)).await?;
        resp.json().await.map_err(|e| SyncError::Parse(e.to_string()))
    }

    async fn create(&self, collection: Collection, record: &Value) -> Result<(), SyncError> {
        let url = self.url(&[collection.name()])?;
        self.send(self.client.post(url).json(record)).await?;
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &RecordId, record: &Value) -> Result<(), SyncError> {
        let url = self.url(&[collection.name(), id.as_str()])?;
        self.send(self.client.put(url).json(record)).await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), SyncError> {
        let url = self.url(&[collection.name(), id.as_str()])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
