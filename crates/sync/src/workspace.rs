//! Application bootstrap: local store + optional remote mirror.

use std::sync::Arc;

use anyhow::Context;

use nexus_infra::{AppConfig, Book, SqliteStore};

use crate::hydrate::{HydrateReport, hydrate};
use crate::queue::{SyncHandle, SyncQueue, SyncStats};
use crate::remote::HttpRemote;

/// An opened book, wired to the remote mirror when one is configured.
pub struct Workspace {
    book: Book<SqliteStore>,
    sync: Option<SyncQueue>,
    hydrated: Option<HydrateReport>,
}

impl Workspace {
    /// Open the local store and, if `api_url` is set, hydrate from the
    /// remote and start the sync worker.
    ///
    /// An unreachable remote is not an error; a malformed URL is.
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let db_path = config.local_db_path();
        let book = Book::new(SqliteStore::open(&db_path)?);
        tracing::info!(db_path = %db_path.display(), "local store opened");

        let Some(api_url) = config.api_url else {
            return Ok(Self {
                book,
                sync: None,
                hydrated: None,
            });
        };

        let remote = Arc::new(
            HttpRemote::new(&api_url).with_context(|| format!("invalid {}", nexus_infra::config::API_URL_VAR))?,
        );
        if !remote.check_connectivity().await {
            tracing::warn!(api_url = %api_url, "remote mirror not reachable");
        }

        let report = hydrate(&book, remote.as_ref()).await;
        let queue = SyncQueue::spawn(remote);
        let book = book.with_sink(Arc::new(queue.handle()));
        tracing::info!(api_url = %api_url, "remote sync enabled");

        Ok(Self {
            book,
            sync: Some(queue),
            hydrated: Some(report),
        })
    }

    pub fn book(&self) -> &Book<SqliteStore> {
        &self.book
    }

    pub fn sync_handle(&self) -> Option<SyncHandle> {
        self.sync.as_ref().map(SyncQueue::handle)
    }

    pub fn hydrate_report(&self) -> Option<&HydrateReport> {
        self.hydrated.as_ref()
    }

    /// Push whatever is still queued and stop the worker.
    pub async fn close(self) -> Option<SyncStats> {
        let Workspace { book, sync, .. } = self;
        drop(book);
        match sync {
            Some(queue) => Some(queue.shutdown().await),
            None => None,
        }
    }
}
